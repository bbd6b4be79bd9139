//! Parsed form of the frame's metadata JSON block.

use serde_json::{Map, Value};

use crate::error::Result;

/// Recognized metadata keys, plus any unrecognized entries preserved
/// verbatim for round-tripping.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub character_name: String,
    pub main_hero_level: i64,
    /// `DayLong` arrives as a float in the JSON; the engine stores the
    /// truncated integer day count per the documented behavior.
    pub day_long: i64,
    pub play_time: f64,
    pub clan_name: Option<String>,
    pub gold: i64,
    /// Entries this build does not recognize, kept so they survive a
    /// decode/encode round trip unchanged.
    pub extra: Map<String, Value>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            character_name: String::new(),
            main_hero_level: 0,
            day_long: 0,
            play_time: 0.0,
            clan_name: None,
            gold: 0,
            extra: Map::new(),
        }
    }
}

impl Metadata {
    /// Parses a `Metadata` out of the frame's raw JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let mut object = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let character_name = take_string(&mut object, "CharacterName").unwrap_or_default();
        let main_hero_level = take_i64(&mut object, "MainHeroLevel").unwrap_or(0);
        let day_long = take_f64(&mut object, "DayLong").unwrap_or(0.0) as i64;
        let play_time = take_f64(&mut object, "PlayTime").unwrap_or(0.0);
        let clan_name = take_string(&mut object, "ClanName");
        let gold = take_i64(&mut object, "Gold").unwrap_or(0);

        Ok(Self {
            character_name,
            main_hero_level,
            day_long,
            play_time,
            clan_name,
            gold,
            extra: object,
        })
    }

    /// Serializes back to the recognized keys plus whatever pass-through
    /// entries were preserved on load.
    pub fn to_json(&self) -> Result<String> {
        let mut object = self.extra.clone();
        object.insert("CharacterName".to_string(), Value::String(self.character_name.clone()));
        object.insert(
            "MainHeroLevel".to_string(),
            Value::Number(self.main_hero_level.into()),
        );
        object.insert(
            "DayLong".to_string(),
            serde_json::Number::from_f64(self.day_long as f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        );
        object.insert(
            "PlayTime".to_string(),
            serde_json::Number::from_f64(self.play_time)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        );
        if let Some(clan_name) = &self.clan_name {
            object.insert("ClanName".to_string(), Value::String(clan_name.clone()));
        }
        object.insert("Gold".to_string(), Value::Number(self.gold.into()));

        Ok(serde_json::to_string(&Value::Object(object))?)
    }
}

fn take_string(object: &mut Map<String, Value>, key: &str) -> Option<String> {
    object.remove(key).and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn take_i64(object: &mut Map<String, Value>, key: &str) -> Option<i64> {
    object.remove(key).and_then(|v| v.as_i64())
}

fn take_f64(object: &mut Map<String, Value>, key: &str) -> Option<f64> {
    object.remove(key).and_then(|v| v.as_f64())
}
