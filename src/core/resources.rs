use anyhow::Context;
use bevy::prelude::*;
use serde_derive::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::sockets::SlotSocketMapping;

pub const CONFIG_PATH: &str = "assets/config/equipment.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("drop_force must be finite and non-negative, got {0}")]
    InvalidDropForce(f32),
    #[error("gravity must be finite, got {0:?}")]
    InvalidGravity([f32; 3]),
}

/// 装备系统配置（TOML）
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EquipmentSettings {
    /// 丢弃时给实例添加 / 启用刚体
    pub add_rigid_body_on_drop: bool,
    /// 丢弃冲量大小，沿角色朝向
    pub drop_force: f32,
    pub gravity: [f32; 3],
    pub ground_height: f32,
    /// 槽位 → 挂点映射
    pub mappings: Vec<SlotSocketMapping>,
}

impl Default for EquipmentSettings {
    fn default() -> Self {
        Self {
            add_rigid_body_on_drop: true,
            drop_force: 2.0,
            gravity: [0.0, -9.81, 0.0],
            ground_height: 0.0,
            mappings: Vec::new(),
        }
    }
}

impl EquipmentSettings {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(text).context("invalid equipment settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// 读取失败时退回默认配置
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("使用默认装备配置: {err:#}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.drop_force.is_finite() || self.drop_force < 0.0 {
            return Err(ConfigError::InvalidDropForce(self.drop_force));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::InvalidGravity(self.gravity));
        }
        Ok(())
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::from_array(self.gravity)
    }
}
