//! 文字 CLI：读取 stdin → 解析命令 → 执行并打印

use bevy::app::AppExit;
use bevy::prelude::*;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::num::NonZero;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::character::components::Player;
use crate::character::events::{ShowEquipment, ShowSockets};
use crate::core::{events::LogEvent, states::AppState};
use crate::data::ItemCatalog;
use crate::equipment::events::{DropRequest, EquipRequest, UnequipRequest};
use crate::equipment::{EquipmentController, EquipmentSlotType, InstanceSource};
use crate::pickup::PickupRequest;

static CLI_BUFFER: Lazy<Arc<Mutex<VecDeque<String>>>> =
    Lazy::new(|| Arc::new(Mutex::new(VecDeque::new())));

/// 插件入口
pub struct DebugCliPlugin;
impl Plugin for DebugCliPlugin {
    fn build(&self, app: &mut App) {
        {
            let buffer = CLI_BUFFER.clone();
            std::thread::spawn(move || {
                use std::io::{self, BufRead};
                let stdin = io::stdin();
                for line in stdin.lock().lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Ok(mut buf) = buffer.lock() {
                        buf.push_back(line.to_string());
                    }
                }
            });
        }
        app
            // 事件：原始输入行
            .add_event::<CliLine>()
            // 每帧从 buffer 取出所有命令行写入事件
            .add_systems(Update, read_stdin)
            // 仅在 InGame 处理命令
            .add_systems(
                Update,
                execute_cli_commands.run_if(in_state(AppState::InGame)),
            );
    }
}

/* ---------------------------- 事件与枚举 ---------------------------- */

/// 终端敲的一整行
#[derive(Event)]
struct CliLine(String);

/// 我们支持的命令
#[derive(Debug, PartialEq)]
enum Command {
    Help,
    Status,
    Exit,
    Items(Option<String>), // None=全部；Some(token)=按 id/uuid/name 查询
    Equip(String),
    Unequip(String),
    Drop(String),
    Pickup(Option<String>), // None=最近的；Some(name)=按名称
    Equipment,
    Sockets,
    Unsupported(String),
}

/* ---------------------------- 读取 stdin ---------------------------- */

fn read_stdin(mut writer: EventWriter<CliLine>) {
    let Ok(mut buffer) = CLI_BUFFER.lock() else {
        return;
    };
    while let Some(line) = buffer.pop_front() {
        writer.write(CliLine(line));
    }
}

/* ---------------------------- 命令执行 ---------------------------- */

#[allow(clippy::too_many_arguments)]
fn execute_cli_commands(
    mut line_reader: EventReader<CliLine>,
    mut app_exit: EventWriter<AppExit>,
    mut log: EventWriter<LogEvent>,
    state: Res<State<AppState>>,
    catalog: Res<ItemCatalog>,
    player_query: Query<(Entity, &EquipmentController), With<Player>>,
    mut ev_equip: EventWriter<EquipRequest>,
    mut ev_unequip: EventWriter<UnequipRequest>,
    mut ev_drop: EventWriter<DropRequest>,
    mut ev_pickup: EventWriter<PickupRequest>,
    mut ev_show_equipment: EventWriter<ShowEquipment>,
    mut ev_show_sockets: EventWriter<ShowSockets>,
) {
    for CliLine(input) in line_reader.read() {
        let player = player_query.single().ok();

        match parse_command(input) {
            Command::Help => {
                log.write(LogEvent(
                    "命令列表:
  help                   查看帮助
  status                 查看当前状态
  exit / quit            退出程序
  items                  列出所有物品
  items <token>          用 id / uuid / 名称 查询单个物品
  equip <id>             装备物品
  unequip <slot>         卸下槽位中的物品
  drop <slot>            把槽位中的物品丢到地上
  pickup [name]          拾取最近的（或指定名称的）物品
  equipment              查看装备状态
  sockets                查看挂点
  ".into()));
            }

            Command::Status => {
                let equipped = player.map_or(0, |(_, controller)| {
                    EquipmentSlotType::ALL
                        .into_iter()
                        .filter(|slot| controller.is_slot_occupied(*slot))
                        .count()
                });
                log.write(LogEvent(format!(
                    "State: {:?}, Items Loaded: {}, Equipped: {}",
                    state.get(),
                    catalog.len(),
                    equipped
                )));
            }

            Command::Exit => {
                log.write(LogEvent("Bye~".into()));
                app_exit.write(AppExit::Error(NonZero::<u8>::MIN));
            }

            Command::Items(token) => match token {
                None => {
                    // 全部列出
                    for (id, item) in catalog.iter() {
                        let uuid = uuid_from_id(id);
                        log.write(LogEvent(format!(
                            "{} | {} | {} | {}",
                            uuid,
                            id,
                            item.name(),
                            item.slot_type()
                        )));
                    }
                }
                Some(t) => {
                    // 按三种字段模糊匹配
                    let t_low = t.to_lowercase();
                    if let Some((id, item)) = catalog.iter().find(|(id, item)| {
                        id.eq_ignore_ascii_case(&t_low)
                            || item.name().eq_ignore_ascii_case(&t_low)
                            || uuid_from_id(id).to_string() == t_low
                    }) {
                        let uuid = uuid_from_id(id);
                        let visual = item.prefab().map_or("-", |template| template.name.as_str());
                        log.write(LogEvent(format!(
                            "==================================================
UUID   : {uuid}
ID     : {id}
Name   : {}
Slot   : {}
Visual : {visual}
==================================================",
                            item.name(),
                            item.slot_type()
                        )));
                    } else {
                        log.write(LogEvent("未找到匹配物品".into()));
                    }
                }
            },

            Command::Equip(id) => {
                let Some((owner, _)) = player else {
                    log.write(LogEvent("未找到玩家".into()));
                    continue;
                };
                match catalog.get(&id) {
                    Some(item) => {
                        ev_equip.write(EquipRequest {
                            owner,
                            item,
                            source: InstanceSource::Spawn,
                        });
                    }
                    None => {
                        log.write(LogEvent(format!("未找到物品: {id}")));
                    }
                }
            }

            Command::Unequip(token) | Command::Drop(token)
                if EquipmentSlotType::parse(&token).is_none() =>
            {
                log.write(LogEvent(format!("未知槽位: {token}")));
            }

            Command::Unequip(token) => {
                if let (Some((owner, _)), Some(slot)) = (player, EquipmentSlotType::parse(&token)) {
                    ev_unequip.write(UnequipRequest { owner, slot });
                }
            }

            Command::Drop(token) => {
                if let (Some((owner, _)), Some(slot)) = (player, EquipmentSlotType::parse(&token)) {
                    ev_drop.write(DropRequest { owner, slot });
                }
            }

            Command::Pickup(name) => {
                if let Some((interactor, _)) = player {
                    ev_pickup.write(PickupRequest { interactor, name });
                }
            }

            Command::Equipment => {
                ev_show_equipment.write(ShowEquipment { entity: None });
            }

            Command::Sockets => {
                ev_show_sockets.write(ShowSockets { entity: None });
            }

            Command::Unsupported(cmd) => {
                log.write(LogEvent(format!("不支持的命令: {cmd}")));
            }
        }
    }
}

/* ---------------------------- 工具函数 ---------------------------- */

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    match cmd.as_str() {
        "help" | "h" | "?" => Command::Help,
        "status" | "s" => Command::Status,
        "exit" | "quit" | "q" => Command::Exit,
        "items" | "item" | "i" => {
            let token = parts.next().map(|s| s.to_string());
            Command::Items(token)
        }
        "equip" | "e" => Command::Equip(parts.next().unwrap_or("").to_string()),
        "unequip" | "u" => Command::Unequip(parts.next().unwrap_or("").to_string()),
        "drop" | "d" => Command::Drop(parts.next().unwrap_or("").to_string()),
        "pickup" | "p" => {
            // 名称里可能带空格
            let name = parts.collect::<Vec<_>>().join(" ");
            Command::Pickup((!name.is_empty()).then_some(name))
        }
        "equipment" | "eq" => Command::Equipment,
        "sockets" => Command::Sockets,
        other => Command::Unsupported(other.into()),
    }
}

fn uuid_from_id(id: &str) -> Uuid {
    // 用固定 namespace + id 字节生成版本 5 UUID，保证可重复得到同一值
    Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_equipment_commands() {
        assert_eq!(parse_command("equip sword"), Command::Equip("sword".into()));
        assert_eq!(
            parse_command("DROP primary_weapon"),
            Command::Drop("primary_weapon".into())
        );
        assert_eq!(parse_command("u head"), Command::Unequip("head".into()));
        assert_eq!(parse_command("eq"), Command::Equipment);
        assert_eq!(parse_command("dance"), Command::Unsupported("dance".into()));
    }

    #[test]
    fn pickup_name_keeps_spaces() {
        assert_eq!(parse_command("pickup"), Command::Pickup(None));
        assert_eq!(
            parse_command("pickup Iron  Sword"),
            Command::Pickup(Some("Iron Sword".into()))
        );
    }

    #[test]
    fn uuid_is_stable_per_id() {
        assert_eq!(uuid_from_id("sword"), uuid_from_id("sword"));
        assert_ne!(uuid_from_id("sword"), uuid_from_id("shield"));
    }
}
