//! Slash command definitions registered with the guild

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption, Permissions};

use lazy_core::AccessTier;
use lazy_service::services::commands::slash;

fn user_option(name: &str, description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::User, name, description).required(true)
}

fn reason_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "reason", description).max_length(512)
}

fn key() -> CreateCommand {
    CreateCommand::new(slash::KEY)
        .description("Key management commands")
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "generate", "Generate a new key")
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "days",
                        "Number of days for the key",
                    )
                    .required(true)
                    .min_int_value(1)
                    .max_int_value(3650),
                )
                .add_sub_option(
                    CreateCommandOption::new(CommandOptionType::String, "note", "Note for the key")
                        .required(true)
                        .max_length(200),
                ),
        )
}

fn hwid_reset() -> CreateCommand {
    CreateCommand::new(slash::HWID_RESET)
        .description("Reset HWID for a key")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "key", "The key to reset HWID for")
                .required(true)
                .max_length(128),
        )
}

fn list() -> CreateCommand {
    CreateCommand::new(slash::LIST)
        .description("List your generated keys")
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "keys",
            "List all your generated keys",
        ))
}

fn access() -> CreateCommand {
    let tier = AccessTier::ALL.iter().fold(
        CreateCommandOption::new(CommandOptionType::String, "tier", "Access tier to grant")
            .required(true),
        |option, tier| option.add_string_choice(tier.label(), tier.as_str()),
    );

    CreateCommand::new(slash::ACCESS)
        .description("Manage access to the bot.")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "grant", "Grant access to the bot.")
                .add_sub_option(user_option("member", "The member to grant access to."))
                .add_sub_option(tier)
                .add_sub_option(reason_option("The reason for granting access to the bot.")),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "revoke", "Revoke access to the bot.")
                .add_sub_option(user_option("member", "The member to revoke access from."))
                .add_sub_option(reason_option("The reason for revoking access to the bot.")),
        )
}

fn application() -> CreateCommand {
    CreateCommand::new(slash::APPLICATION)
        .description("Manage user applications.")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "approve",
                "Approve a user's application.",
            )
            .add_sub_option(user_option("user", "The user to approve"))
            .add_sub_option(reason_option("Reason for approval")),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "deny", "Deny a user's application.")
                .add_sub_option(user_option("user", "The user to deny"))
                .add_sub_option(reason_option("Reason for denial")),
        )
}

/// Every slash command the bot serves
pub fn definitions() -> Vec<CreateCommand> {
    vec![key(), hwid_reset(), list(), access(), application()]
}
