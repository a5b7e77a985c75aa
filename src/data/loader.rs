use bevy::asset::{io::Reader, ron, AssetLoader, LoadContext};
use bevy::prelude::*;
use std::future::Future;
use thiserror::Error;

use super::schema::ItemList;

#[derive(Default)]
pub struct RonItemLoader;

#[derive(Debug, Error)]
pub enum RonItemLoaderError {
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Could not interpret bytes as UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Item `{id}` has no equipment slot")]
    MissingSlot { id: String },
    #[error("Item id `{id}` is defined more than once")]
    DuplicateId { id: String },
}

/// 解析并校验物品表
pub fn parse_item_list(bytes: &[u8]) -> Result<ItemList, RonItemLoaderError> {
    let s = std::str::from_utf8(bytes)?;
    let list: ItemList = ron::de::from_str(s)?;

    // 槽位为 None 的物品永远无法装备
    if let Some(bad) = list.items.iter().find(|item| item.slot.is_none()) {
        return Err(RonItemLoaderError::MissingSlot { id: bad.id.clone() });
    }

    // 目录按 id 忽略大小写查找，只差大小写的 id 也算重复
    for (index, item) in list.items.iter().enumerate() {
        if list.items[..index]
            .iter()
            .any(|other| other.id.eq_ignore_ascii_case(&item.id))
        {
            return Err(RonItemLoaderError::DuplicateId { id: item.id.clone() });
        }
    }

    Ok(list)
}

impl AssetLoader for RonItemLoader {
    type Asset = ItemList;
    type Settings = ();
    type Error = RonItemLoaderError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext,
    ) -> impl Future<Output = Result<Self::Asset, Self::Error>> + Send {
        async move {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).await?;
            parse_item_list(&bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_items_without_slot() {
        let err = parse_item_list(br#"(items: [(id: "rock", name: "Rock", slot: None)])"#)
            .unwrap_err();
        assert!(matches!(err, RonItemLoaderError::MissingSlot { ref id } if id == "rock"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = parse_item_list(
            br#"(items: [
                (id: "cap", name: "Cap", slot: Head),
                (id: "cap", name: "Other Cap", slot: Head),
            ])"#,
        )
        .unwrap_err();
        assert!(matches!(err, RonItemLoaderError::DuplicateId { .. }));
    }

    #[test]
    fn duplicate_ids_ignore_case() {
        let err = parse_item_list(
            br#"(items: [
                (id: "Sword", name: "Sword", slot: PrimaryWeapon),
                (id: "sword", name: "Short Sword", slot: PrimaryWeapon),
            ])"#,
        )
        .unwrap_err();
        assert!(matches!(err, RonItemLoaderError::DuplicateId { ref id } if id == "sword"));
    }

    #[test]
    fn reports_malformed_ron() {
        let err = parse_item_list(b"(items: [").unwrap_err();
        assert!(matches!(err, RonItemLoaderError::Ron(_)));
        assert!(err.to_string().starts_with("Could not parse RON"));
    }
}
