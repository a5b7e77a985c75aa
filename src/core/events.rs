use bevy::prelude::*;

/// 面向命令行的输出
#[derive(Event, Debug, Clone)]
pub struct LogEvent(pub String);

pub fn forward_log_event(mut reader: EventReader<LogEvent>) {
    for e in reader.read() {
        println!("> {}", e.0);
    }
}
