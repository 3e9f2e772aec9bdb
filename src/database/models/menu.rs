use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::Document;

/// Editable fields of a menu item. Anything else in the request body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemPatch {
    pub name: Option<Value>,
    pub category: Option<Value>,
    pub price: Option<Value>,
    pub recipe: Option<Value>,
    pub image: Option<Value>,
}

impl MenuItemPatch {
    /// Fields to `$set`, skipping the ones the caller left out.
    pub fn into_set(self) -> Document {
        let fields = [
            ("name", self.name),
            ("category", self.category),
            ("price", self.price),
            ("recipe", self.recipe),
            ("image", self.image),
        ];

        fields
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_keeps_only_menu_fields() {
        let patch: MenuItemPatch = serde_json::from_value(json!({
            "name": "Soup",
            "price": 9.5,
            "_id": "ignored",
            "role": "admin"
        }))
        .unwrap();

        let set = patch.into_set();
        assert_eq!(set.len(), 2);
        assert_eq!(set["name"], "Soup");
        assert_eq!(set["price"], 9.5);
    }
}
