// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use octlib_config::ConfigManager;
use std::path::PathBuf;

mod commands;

fn kind_arg() -> Arg {
    Arg::new("kind")
        .required(true)
        .value_name("KIND")
        .help("books, news, notices, dates or survey")
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).value_name("ID").help("Document id")
}

fn assignments_arg() -> Arg {
    Arg::new("fields")
        .required(true)
        .num_args(1..)
        .value_name("FIELD=VALUE")
        .help("Fields to change, using stored field names (e.g. isNew=false)")
}

fn build_cli() -> Command {
    Command::new("octlib")
        .version(env!("CARGO_PKG_VERSION"))
        .author("OctLib Team")
        .about("Public library site content: browse, reserve and edit")
        .arg(
            Arg::new("config-dir")
                .short('c')
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml (defaults to the user config directory)")
                .global(true),
        )
        .subcommand(Command::new("init").about("Write a default config file"))
        .subcommand(
            Command::new("books").about("List the catalog").arg(
                Arg::new("recommended")
                    .short('r')
                    .long("recommended")
                    .help("Show only recommended books")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(Command::new("news").about("List newsletter issues, newest first"))
        .subcommand(Command::new("notices").about("List notices, newest first"))
        .subcommand(Command::new("dates").about("List closing days"))
        .subcommand(Command::new("feature").about("Show the monthly feature"))
        .subcommand(Command::new("survey").about("List survey questions"))
        .subcommand(Command::new("librarians").about("Introduce the staff"))
        .subcommand(
            Command::new("reserve")
                .about("Reserve a book, or cancel the reservation")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Book id")),
        )
        .subcommand(
            Command::new("want")
                .about("Add a book to the want-to-read list, or remove it")
                .arg(Arg::new("id").required(true).value_name("BOOK_ID").help("Book id")),
        )
        .subcommand(
            Command::new("add")
                .about("Create an item from the default template")
                .arg(kind_arg()),
        )
        .subcommand(
            Command::new("set")
                .about("Update fields of an item")
                .arg(kind_arg())
                .arg(id_arg())
                .arg(assignments_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete an item")
                .arg(kind_arg())
                .arg(id_arg())
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip confirmation prompt")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("feature-set")
                .about("Replace fields of the monthly feature")
                .arg(assignments_arg()),
        )
        .subcommand(
            Command::new("tag")
                .about("Append a rich text tag to an item's content")
                .arg(
                    Arg::new("tool")
                        .required(true)
                        .value_name("TOOL")
                        .help("h1, h2, red, blue, marker, info or quote"),
                )
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .value_name("KIND")
                        .help("news, notices or feature"),
                )
                .arg(id_arg().required(false)),
        )
        .subcommand(
            Command::new("image")
                .about("Append an image to an item's content")
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .value_name("KIND")
                        .help("news, notices or feature"),
                )
                .arg(Arg::new("url").required(true).value_name("URL").help("Image URL"))
                .arg(id_arg().required(false)),
        )
        .subcommand(Command::new("watch").about("Follow changes made by other sessions"))
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = match matches.get_one::<String>("config-dir") {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    }
    .context("Failed to locate the config directory")?;

    let config = manager
        .load_with_env_overrides()
        .context("Failed to load configuration")?;

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(config.app.effective_log_level().to_string()),
    )
    .init();

    if let Some(("init", _)) = matches.subcommand() {
        return commands::init(&manager);
    }

    let mut session = commands::Session::open(&manager, &config)?;

    match matches.subcommand() {
        Some(("books", sub_matches)) => {
            commands::list_books(&session, sub_matches.get_flag("recommended"))
        }
        Some(("news", _)) => commands::list_news(&session),
        Some(("notices", _)) => commands::list_notices(&session),
        Some(("dates", _)) => commands::list_closed_dates(&session),
        Some(("feature", _)) => commands::show_feature(&session),
        Some(("survey", _)) => commands::list_survey(&session),
        Some(("librarians", _)) => commands::list_librarians(&session),
        Some(("reserve", sub_matches)) => commands::toggle_reserve(&mut session, sub_matches),
        Some(("want", sub_matches)) => commands::toggle_want_to_read(&mut session, sub_matches),
        Some(("add", sub_matches)) => commands::add_item(&session, sub_matches),
        Some(("set", sub_matches)) => commands::update_item(&session, sub_matches),
        Some(("delete", sub_matches)) => commands::delete_item(&session, sub_matches),
        Some(("feature-set", sub_matches)) => commands::update_feature(&session, sub_matches),
        Some(("tag", sub_matches)) => commands::insert_tag(&session, sub_matches),
        Some(("image", sub_matches)) => commands::insert_image(&session, sub_matches),
        Some(("watch", _)) => commands::watch(&session),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_set_takes_many_assignments() {
        let matches = build_cli()
            .try_get_matches_from(["octlib", "set", "books", "abc", "isNew=false", "title=x"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let fields: Vec<_> = sub.get_many::<String>("fields").unwrap().collect();
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_config_dir_is_global() {
        let matches = build_cli()
            .try_get_matches_from(["octlib", "news", "--config-dir", "/tmp/octlib"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("config-dir").map(String::as_str),
            Some("/tmp/octlib")
        );
    }
}
