//! Target-platform command vocabulary and line shape checks

/// First words that mark a line as a target-platform command
pub const COMMAND_NAMES: &[&str] = &[
    "advancement",
    "attribute",
    "ban",
    "ban-ip",
    "banlist",
    "bossbar",
    "clear",
    "clone",
    "damage",
    "data",
    "datapack",
    "debug",
    "defaultgamemode",
    "deop",
    "difficulty",
    "effect",
    "enchant",
    "execute",
    "experience",
    "fill",
    "fillbiome",
    "forceload",
    "function",
    "gamemode",
    "gamerule",
    "give",
    "help",
    "item",
    "jfr",
    "kick",
    "kill",
    "list",
    "locate",
    "loot",
    "me",
    "msg",
    "op",
    "pardon",
    "pardon-ip",
    "particle",
    "perf",
    "place",
    "playsound",
    "random",
    "recipe",
    "reload",
    "return",
    "ride",
    "save-all",
    "save-off",
    "save-on",
    "say",
    "schedule",
    "scoreboard",
    "seed",
    "setblock",
    "setidletimeout",
    "setworldspawn",
    "spawnpoint",
    "spectate",
    "spreadplayers",
    "stop",
    "stopsound",
    "summon",
    "tag",
    "team",
    "teammsg",
    "teleport",
    "tell",
    "tellraw",
    "tick",
    "time",
    "title",
    "tm",
    "tp",
    "transfer",
    "trigger",
    "w",
    "weather",
    "whitelist",
    "worldborder",
    "xp",
];

/// Whether a trimmed line is a target-platform command
pub fn is_command_line(line: &str) -> bool {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return false;
    };
    if !COMMAND_NAMES.contains(&first) {
        return false;
    }
    match first {
        "function" => is_function_form(words.next()),
        "return" => is_return_form(line["return".len()..].trim()),
        _ => true,
    }
}

/// `function <ns:name> [args]`
fn is_function_form(target: Option<&str>) -> bool {
    let Some(target) = target else {
        return false;
    };
    let Some((namespace, path)) = target.split_once(':') else {
        return false;
    };
    !namespace.is_empty()
        && !path.is_empty()
        && namespace.chars().all(is_namespace_char)
        && path.chars().all(|c| is_namespace_char(c) || c == '/')
}

/// `return fail`, `return run <command>`, `return <integer>`
fn is_return_form(rest: &str) -> bool {
    if rest == "fail" {
        return true;
    }
    if let Some(command) = rest.strip_prefix("run") {
        return command.starts_with(char::is_whitespace) && !command.trim().is_empty();
    }
    let digits = rest.strip_prefix('-').unwrap_or(rest);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')
}
