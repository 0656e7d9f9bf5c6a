//! The canonical game snapshot and its validation boundary.
//!
//! Everything that crosses a trust boundary - the LLM's narrative JSON, state
//! read back from the store, request bodies - goes through [`GameState::from_value`]
//! before it is treated as a `GameState`. Validation happens in two stages:
//! a structural parse that collects every field violation, then an explicit
//! default-fill for the handful of fields the schema defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FieldError, ValidationError};

/// Default player hit points when the payload omits them.
pub const DEFAULT_PLAYER_HP: f64 = 10.0;

/// An enemy present in the current room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEnemy {
    pub name: String,
    pub hp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<f64>,
}

/// Loot available in the current room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLoot {
    pub name: String,
    pub desc: String,
}

/// The serializable snapshot of the current scene, player, and world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub room: String,
    pub objects: Vec<String>,
    pub exits: Vec<String>,
    pub enemy: Option<GameEnemy>,
    pub loot: Option<GameLoot>,
    pub effect: Option<String>,
    pub player_hp: f64,
    pub player_max_hp: f64,
    pub inventory: Vec<String>,
}

impl GameState {
    /// Validate an arbitrary JSON value into a `GameState`.
    ///
    /// Collects every field violation rather than stopping at the first, so
    /// callers can surface the full list. `playerHp`, `playerMaxHp`, and
    /// `inventory` are filled with defaults when the key is absent; any
    /// present-but-mistyped value is still an error.
    pub fn from_value(value: &Value) -> Result<GameState, ValidationError> {
        parse(value).map(RawGameState::with_defaults)
    }
}

/// Parse stage output: required fields resolved, defaultable fields still
/// optional. Default-fill is a separate step so the two stages stay
/// independently testable.
#[derive(Debug)]
struct RawGameState {
    room: String,
    objects: Vec<String>,
    exits: Vec<String>,
    enemy: Option<GameEnemy>,
    loot: Option<GameLoot>,
    effect: Option<String>,
    player_hp: Option<f64>,
    player_max_hp: Option<f64>,
    inventory: Option<Vec<String>>,
}

impl RawGameState {
    fn with_defaults(self) -> GameState {
        GameState {
            room: self.room,
            objects: self.objects,
            exits: self.exits,
            enemy: self.enemy,
            loot: self.loot,
            effect: self.effect,
            player_hp: self.player_hp.unwrap_or(DEFAULT_PLAYER_HP),
            player_max_hp: self.player_max_hp.unwrap_or(DEFAULT_PLAYER_HP),
            inventory: self.inventory.unwrap_or_default(),
        }
    }
}

fn parse(value: &Value) -> Result<RawGameState, ValidationError> {
    let Some(obj) = value.as_object() else {
        return Err(ValidationError::single("$", "expected a JSON object"));
    };

    let mut errors = Vec::new();

    let room = required_string(obj, "room", &mut errors);
    let objects = string_array(obj, "objects", &mut errors);
    let exits = string_array(obj, "exits", &mut errors);
    let enemy = nullable_enemy(obj, &mut errors);
    let loot = nullable_loot(obj, &mut errors);
    let effect = nullable_string(obj, "effect", &mut errors);
    let player_hp = optional_number(obj, "playerHp", &mut errors);
    let player_max_hp = optional_number(obj, "playerMaxHp", &mut errors);
    let inventory = optional_string_array(obj, "inventory", &mut errors);

    if !errors.is_empty() {
        return Err(ValidationError::new(errors));
    }

    // All accessors pushed an error on failure, so the unwraps below cannot
    // be reached with a None produced by a violation.
    Ok(RawGameState {
        room: room.unwrap_or_default(),
        objects: objects.unwrap_or_default(),
        exits: exits.unwrap_or_default(),
        enemy: enemy.flatten(),
        loot: loot.flatten(),
        effect: effect.flatten(),
        player_hp,
        player_max_hp,
        inventory,
    })
}

fn required_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, "expected a string"));
            None
        }
        None => {
            errors.push(FieldError::new(field, "required"));
            None
        }
    }
}

fn string_array(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Vec<String>> {
    match obj.get(field) {
        Some(Value::Array(items)) => collect_strings(field, items, errors),
        Some(_) => {
            errors.push(FieldError::new(field, "expected an array of strings"));
            None
        }
        None => {
            errors.push(FieldError::new(field, "required"));
            None
        }
    }
}

/// Like [`string_array`] but an absent key is a default, not a violation.
fn optional_string_array(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Vec<String>> {
    match obj.get(field) {
        Some(Value::Array(items)) => collect_strings(field, items, errors),
        Some(_) => {
            errors.push(FieldError::new(field, "expected an array of strings"));
            None
        }
        None => None,
    }
}

fn collect_strings(
    field: &str,
    items: &[Value],
    errors: &mut Vec<FieldError>,
) -> Option<Vec<String>> {
    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => out.push(s.clone()),
            _ => {
                errors.push(FieldError::new(
                    format!("{field}[{i}]"),
                    "expected a string",
                ));
                ok = false;
            }
        }
    }
    ok.then_some(out)
}

/// Fields that default when the key is absent; `null` is still a violation.
fn optional_number(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    match obj.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => {
            errors.push(FieldError::new(field, "expected a number"));
            None
        }
        None => None,
    }
}

/// Nullable fields must carry the key: `null` means "none", absence is a
/// partial object and gets rejected.
fn nullable_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Option<String>> {
    match obj.get(field) {
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(Value::Null) => Some(None),
        Some(_) => {
            errors.push(FieldError::new(field, "expected a string or null"));
            None
        }
        None => {
            errors.push(FieldError::new(field, "required"));
            None
        }
    }
}

fn nullable_enemy(
    obj: &serde_json::Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Option<Option<GameEnemy>> {
    match obj.get("enemy") {
        Some(Value::Object(record)) => {
            let before = errors.len();
            let name = required_string(record, "name", errors);
            let hp = match record.get("hp") {
                Some(Value::Number(n)) => n.as_f64(),
                Some(_) => {
                    errors.push(FieldError::new("hp", "expected a number"));
                    None
                }
                None => {
                    errors.push(FieldError::new("hp", "required"));
                    None
                }
            };
            let max_hp = optional_number(record, "maxHp", errors);
            // Re-scope nested field names under "enemy.".
            for err in &mut errors[before..] {
                err.field = format!("enemy.{}", err.field);
            }
            match (name, hp) {
                (Some(name), Some(hp)) => Some(Some(GameEnemy { name, hp, max_hp })),
                _ => None,
            }
        }
        Some(Value::Null) => Some(None),
        Some(_) => {
            errors.push(FieldError::new("enemy", "expected an object or null"));
            None
        }
        None => {
            errors.push(FieldError::new("enemy", "required"));
            None
        }
    }
}

fn nullable_loot(
    obj: &serde_json::Map<String, Value>,
    errors: &mut Vec<FieldError>,
) -> Option<Option<GameLoot>> {
    match obj.get("loot") {
        Some(Value::Object(record)) => {
            let before = errors.len();
            let name = required_string(record, "name", errors);
            let desc = required_string(record, "desc", errors);
            for err in &mut errors[before..] {
                err.field = format!("loot.{}", err.field);
            }
            match (name, desc) {
                (Some(name), Some(desc)) => Some(Some(GameLoot { name, desc })),
                _ => None,
            }
        }
        Some(Value::Null) => Some(None),
        Some(_) => {
            errors.push(FieldError::new("loot", "expected an object or null"));
            None
        }
        None => {
            errors.push(FieldError::new("loot", "required"));
            None
        }
    }
}
