//! Constraint catalog for every command the bot exposes

use std::collections::HashMap;
use std::time::Duration;

use lazy_common::GuildConfig;
use lazy_core::{CommandConstraints, Snowflake};

/// Between two key generations by the same member
pub const KEY_COOLDOWN: Duration = Duration::from_secs(15 * 60);
/// Between two staff prefix commands by the same member
pub const PREFIX_COOLDOWN: Duration = Duration::from_secs(10);

/// Slash command names
pub mod slash {
    pub const KEY: &str = "key";
    pub const HWID_RESET: &str = "hwid-reset";
    pub const LIST: &str = "list";
    pub const ACCESS: &str = "access";
    pub const APPLICATION: &str = "application";
}

/// Prefix command names (aliases resolve to these)
pub mod prefix {
    pub const APPLICATION: &str = "application";
    pub const PURCHASE: &str = "purchase";
    pub const EMBED: &str = "embed";
}

const PREFIX_ALIASES: [(&str, &str); 3] = [
    ("app", prefix::APPLICATION),
    ("buy", prefix::PURCHASE),
    ("em", prefix::EMBED),
];

/// Which surface a command was invoked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSurface {
    Slash,
    Prefix,
}

/// Constraints per command, built once from the guild settings
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    slash: HashMap<&'static str, CommandConstraints>,
    prefix: HashMap<&'static str, CommandConstraints>,
}

impl CommandCatalog {
    pub fn new(guild: &GuildConfig, owner_id: Snowflake) -> Self {
        let key_channel = [guild.key_channel_id];
        let staff = [guild.staff_role_id];
        // Unset ids declare no list; staff commands stay shut instead of open
        let no_staff = guild.staff_role_id.is_zero();
        let no_admin = no_staff && owner_id.is_zero();

        let mut slash_commands = HashMap::new();
        slash_commands.insert(
            slash::KEY,
            CommandConstraints::new()
                .allowed_channels(key_channel)
                .user_cooldown(KEY_COOLDOWN),
        );
        slash_commands.insert(
            slash::LIST,
            CommandConstraints::new().allowed_channels(key_channel),
        );
        slash_commands.insert(slash::HWID_RESET, CommandConstraints::new());
        slash_commands.insert(
            slash::ACCESS,
            CommandConstraints::new()
                .optional_allowed_users([owner_id])
                .optional_allowed_roles(staff)
                .disabled(no_admin),
        );
        slash_commands.insert(
            slash::APPLICATION,
            CommandConstraints::new().allowed_roles(staff).disabled(no_staff),
        );

        let prefix_commands = [prefix::APPLICATION, prefix::PURCHASE, prefix::EMBED]
            .into_iter()
            .map(|name| {
                let constraints = CommandConstraints::new()
                    .allowed_roles(staff)
                    .disabled(no_staff)
                    .user_cooldown(PREFIX_COOLDOWN);
                (name, constraints)
            })
            .collect();

        Self {
            slash: slash_commands,
            prefix: prefix_commands,
        }
    }

    pub fn get(&self, surface: CommandSurface, name: &str) -> Option<&CommandConstraints> {
        match surface {
            CommandSurface::Slash => self.slash.get(name),
            CommandSurface::Prefix => self.prefix.get(name),
        }
    }

    /// Canonical name of a prefix command or alias
    pub fn resolve_prefix(word: &str) -> Option<&'static str> {
        let word = word.to_lowercase();
        [prefix::APPLICATION, prefix::PURCHASE, prefix::EMBED]
            .into_iter()
            .find(|name| *name == word)
            .or_else(|| {
                PREFIX_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == word)
                    .map(|(_, name)| *name)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validator::CommandValidator;
    use crate::testing::{guild_config, BOT_OWNER};
    use chrono::Utc;
    use lazy_cache::CooldownStore;
    use lazy_core::{ChannelContext, ChannelKind, Condition, Denial, Invocation, Verdict};

    fn catalog() -> CommandCatalog {
        CommandCatalog::new(&guild_config(), BOT_OWNER)
    }

    fn text_channel(id: Snowflake) -> ChannelContext {
        ChannelContext {
            id,
            kind: ChannelKind::GuildText,
            parent_id: None,
            nsfw: false,
        }
    }

    #[test]
    fn test_resolve_prefix_aliases() {
        assert_eq!(CommandCatalog::resolve_prefix("APP"), Some(prefix::APPLICATION));
        assert_eq!(CommandCatalog::resolve_prefix("buy"), Some(prefix::PURCHASE));
        assert_eq!(CommandCatalog::resolve_prefix("embed"), Some(prefix::EMBED));
        assert_eq!(CommandCatalog::resolve_prefix("help"), None);
    }

    #[test]
    fn test_every_command_is_cataloged() {
        let catalog = catalog();
        for name in [slash::KEY, slash::HWID_RESET, slash::LIST, slash::ACCESS, slash::APPLICATION] {
            assert!(catalog.get(CommandSurface::Slash, name).is_some(), "{name}");
        }
        for name in [prefix::APPLICATION, prefix::PURCHASE, prefix::EMBED] {
            assert!(catalog.get(CommandSurface::Prefix, name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_key_command_limited_to_key_channel() {
        let catalog = catalog();
        let guild = guild_config();
        let store = CooldownStore::new();
        let validator = CommandValidator::new(&store, BOT_OWNER);
        let constraints = catalog.get(CommandSurface::Slash, slash::KEY).unwrap();
        let now = Utc::now();

        let elsewhere = Invocation::new(Snowflake::new(5)).in_channel(text_channel(Snowflake::new(99)));
        assert!(!validator.check(slash::KEY, constraints, &elsewhere, now).is_allowed());

        let here = Invocation::new(Snowflake::new(5)).in_channel(text_channel(guild.key_channel_id));
        assert!(validator.check(slash::KEY, constraints, &here, now).is_allowed());
        let again = validator.check(slash::KEY, constraints, &here, now);
        assert!(matches!(again, Verdict::Denied(Denial::Cooldown(_))));
    }

    #[test]
    fn test_access_allows_owner_or_staff() {
        let catalog = catalog();
        let guild = guild_config();
        let store = CooldownStore::new();
        let validator = CommandValidator::new(&store, BOT_OWNER);
        let constraints = catalog.get(CommandSurface::Slash, slash::ACCESS).unwrap();
        let now = Utc::now();

        let no_roles: Vec<Snowflake> = Vec::new();
        let staff = vec![guild.staff_role_id];

        let owner = Invocation::new(BOT_OWNER).with_member(&no_roles);
        assert!(validator.check(slash::ACCESS, constraints, &owner, now).is_allowed());

        let staffer = Invocation::new(Snowflake::new(5)).with_member(&staff);
        assert!(validator.check(slash::ACCESS, constraints, &staffer, now).is_allowed());

        let member = Invocation::new(Snowflake::new(6)).with_member(&no_roles);
        assert!(!validator.check(slash::ACCESS, constraints, &member, now).is_allowed());
    }

    #[test]
    fn test_staff_commands_shut_without_owner_or_staff_role() {
        let guild = GuildConfig {
            staff_role_id: Snowflake::default(),
            ..guild_config()
        };
        let catalog = CommandCatalog::new(&guild, Snowflake::default());
        let store = CooldownStore::new();
        let validator = CommandValidator::new(&store, Snowflake::default());
        let now = Utc::now();
        let no_roles: Vec<Snowflake> = Vec::new();
        let member = Invocation::new(Snowflake::new(6)).with_member(&no_roles);
        let disabled = Verdict::Denied(Denial::Condition(Condition::IsDisabled));

        for (surface, name) in [
            (CommandSurface::Slash, slash::ACCESS),
            (CommandSurface::Slash, slash::APPLICATION),
            (CommandSurface::Prefix, prefix::EMBED),
        ] {
            let constraints = catalog.get(surface, name).unwrap();
            assert_eq!(validator.check(name, constraints, &member, now), disabled, "{name}");
        }
    }

    #[test]
    fn test_access_left_to_owner_when_staff_role_unset() {
        let guild = GuildConfig {
            staff_role_id: Snowflake::default(),
            ..guild_config()
        };
        let catalog = CommandCatalog::new(&guild, BOT_OWNER);
        let store = CooldownStore::new();
        let validator = CommandValidator::new(&store, BOT_OWNER);
        let constraints = catalog.get(CommandSurface::Slash, slash::ACCESS).unwrap();
        let now = Utc::now();
        let no_roles: Vec<Snowflake> = Vec::new();

        let owner = Invocation::new(BOT_OWNER).with_member(&no_roles);
        assert!(validator.check(slash::ACCESS, constraints, &owner, now).is_allowed());
        let member = Invocation::new(Snowflake::new(6)).with_member(&no_roles);
        assert!(!validator.check(slash::ACCESS, constraints, &member, now).is_allowed());
    }
}
