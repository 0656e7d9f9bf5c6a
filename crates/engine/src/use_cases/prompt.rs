//! Authored game content: the narrator instructions and the opening scene.

use dungeonmind_domain::{GameLoot, GameState};

/// Fallback room text when the generator cannot be consulted.
pub fn fallback_room(command: &str) -> String {
    format!("你执行了命令：\"{command}\"，但是什么也没有发生。")
}

/// Fallback effect line when the generator cannot be consulted.
pub const FALLBACK_EFFECT: &str = "系统暂时无法处理你的命令，请稍后再试。";

/// The opening scene every fresh session starts from.
pub fn initial_state() -> GameState {
    GameState {
        room: "你站在异世界地下城的入口大厅。古老的石柱支撑着高大的拱顶，墙壁上镶嵌着发光的魔法水晶。地面铺着磨损的石板，远处传来神秘的回声。作为转生的勇者，你感受到体内涌动的力量。"
            .to_string(),
        objects: vec![
            "魔法水晶".to_string(),
            "古老石桌".to_string(),
            "勇者装备箱".to_string(),
        ],
        exits: vec!["north".to_string(), "east".to_string(), "west".to_string()],
        enemy: None,
        loot: Some(GameLoot {
            name: "新手剑".to_string(),
            desc: "锋利的铁剑，适合初学者使用".to_string(),
        }),
        effect: Some("你感受到了异世界的魔力在体内觉醒".to_string()),
        player_hp: 12.0,
        player_max_hp: 12.0,
        inventory: vec!["勇者徽章".to_string()],
    }
}

/// Build the narrator system prompt for one turn, embedding the serialized
/// current state and the JSON format rules the model must follow.
pub fn system_prompt(current_state: &GameState) -> String {
    let serialized = serde_json::to_string_pretty(current_state)
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"你是一个文字地牢冒险游戏引擎，请根据玩家的输入，返回一个当前游戏状态的 JSON 格式描述，必须严格符合如下结构：

当前游戏状态：
{serialized}

{{
  "room": "房间描述，简洁但有画面感，比如：'你站在一间潮湿的石室中，墙上挂着破烂的布幔。'",
  "objects": ["房间内可以互动的对象，如：石桌、宝箱、雕像等"],
  "exits": ["可以离开的方向，如：north", "south", "east", "west"],
  "enemy": {{"name": "敌人名称，如哥布林", "hp": 敌人当前血量（整数）, "maxHp": 敌人最大血量（整数）}}，如果没有敌人请设置为 null，
  "loot": {{"name": "道具名称，如红药水瓶", "desc": "道具描述，如'可以恢复2点生命值'"}}，如果没有请设为 null，
  "effect": "当前回合的额外效果描述，比如'你受到敌人攻击，失去2点生命'，没有请设为 null",
  "playerHp": 玩家当前血量（整数）,
  "playerMaxHp": 玩家最大血量（整数）,
  "inventory": ["背包物品1", "背包物品2"]
}}

请根据玩家的输入内容合理生成结果。例如：

- 如果玩家输入"向北走"，你应更换房间描述、可能更新 exits、objects 和 enemy。
- 如果玩家输入"攻击哥布林"，你应处理战斗逻辑，例如敌人掉血、是否死亡、是否反击等。
- 如果玩家输入"使用红药水"，请在 effect 中描述其效果，并适当移除 loot。

返回的 JSON 必须结构完整、字段齐全、键名固定，避免包含任何解释性文字或代码块标记。

游戏风格偏向轻度奇幻，不要太过黑暗。保持语言清晰简洁，适合普通玩家阅读。对象名称要丰富多样，包括：宝箱、钥匙、剑、盾、书籍、王冠、宝石、金币、锤子、斧头、卷轴、奖杯、药水、魔法道具、星石等。"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_scene_validates_against_the_schema() {
        let wire = serde_json::to_value(initial_state()).expect("serialize");
        GameState::from_value(&wire).expect("authored constant must be valid");
    }

    #[test]
    fn system_prompt_embeds_the_current_state() {
        let state = initial_state();
        let prompt = system_prompt(&state);
        assert!(prompt.contains("勇者徽章"));
        assert!(prompt.contains("playerHp"));
    }

    #[test]
    fn fallback_room_names_the_command() {
        assert!(fallback_room("向北走").contains("向北走"));
    }
}
