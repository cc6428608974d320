// FILE: crates/cli/src/commands.rs

use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use console::style;
use octlib_config::{Config, ConfigManager};
use octlib_core::{
    defaults, today_iso, AppError, Book, BookPatch, ClosedDatePatch, Collection, MonthlyFeature,
    NewsPatch, NoticePatch, Patch, SurveyQuestionPatch,
};
use octlib_preferences::{FileKeyValueStore, KeyValueStore};
use octlib_rich_text::{RichDocument, Tool};
use octlib_sync_engine::{
    Connection, DeleteOutcome, DocumentStore, FileStore, LibrarySite, MutationGateway,
    SiteOptions, SyncResult,
};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;


const EXCERPT_CHARS: usize = 60;

/// Everything a command needs: the running site and, when connected, the
/// store file it reads from
pub struct Session {
    pub site: LibrarySite,
    pub store: Option<Arc<FileStore>>,
    pub watch_interval: Duration,
}

impl Session {
    /// Opens the configured store and preferences
    pub fn open(manager: &ConfigManager, config: &Config) -> Result<Self> {
        let data_file = (!config.store.offline)
            .then(|| manager.resolve_path(&config.store.data_file));
        let preferences_file = manager.resolve_path(&config.device.preferences_file);

        Ok(Self::open_paths(
            data_file.as_deref(),
            &preferences_file,
            config.store.seed_on_empty,
            Duration::from_millis(config.store.watch_interval_ms),
        ))
    }

    /// Opens a session on explicit paths. A store that cannot be opened
    /// leaves the session disconnected rather than failing.
    pub fn open_paths(
        data_file: Option<&Path>,
        preferences_file: &Path,
        seed_on_empty: bool,
        watch_interval: Duration,
    ) -> Self {
        let preferences: Arc<dyn KeyValueStore> =
            Arc::new(FileKeyValueStore::open(preferences_file));

        let store = match data_file {
            Some(path) => match FileStore::open(path) {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    log::warn!("Store {} could not be opened: {}", path.display(), e);
                    None
                }
            },
            None => {
                log::info!("Store disabled by configuration");
                None
            }
        };

        let connection = match &store {
            Some(store) => Connection::Connected(store.clone() as Arc<dyn DocumentStore>),
            None => Connection::Unavailable,
        };
        let options = SiteOptions {
            seed_on_empty,
            ..Default::default()
        };

        Self {
            site: LibrarySite::start(connection, preferences, options),
            store,
            watch_interval,
        }
    }

    fn gateway(&self) -> &MutationGateway {
        self.site.gateway()
    }
}

/// Write a default config file
pub fn init(manager: &ConfigManager) -> Result<()> {
    let created = manager
        .initialize()
        .context("Failed to write the config file")?;

    if created {
        println!(
            "{} Config written to {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!(
            "Config already exists at {}",
            manager.config_path().display()
        );
    }
    Ok(())
}

/// List the catalog
pub fn list_books(session: &Session, recommended_only: bool) -> Result<()> {
    let view = session.site.view();
    let books: Vec<&Book> = if recommended_only {
        view.recommended_books()
    } else {
        view.books.iter().collect()
    };

    if books.is_empty() {
        println!("No books.");
        return Ok(());
    }

    print_header(books.len(), "Books");
    for book in books {
        let mut badges = Vec::new();
        if book.is_new {
            badges.push(style("NEW").green().to_string());
        }
        if book.is_recommended {
            badges.push(style("おすすめ").yellow().to_string());
        }
        if view.is_reserved(&book.id) {
            badges.push(style("予約済み").cyan().to_string());
        }
        if view.wants_to_read(&book.id) {
            badges.push(style("読みたい").magenta().to_string());
        }

        println!("\n{} {}", style(&book.title).bold(), badges.join(" "));
        println!("  {} | {}", book.author, book.category);
        println!("  ID: {}", book.id);
        println!("  {}", excerpt(&book.description));
    }
    Ok(())
}

/// List newsletter issues
pub fn list_news(session: &Session) -> Result<()> {
    let news = session.site.view().news;
    if news.is_empty() {
        println!("No newsletters.");
        return Ok(());
    }

    print_header(news.len(), "Newsletters");
    for item in news {
        println!("\n{} {}", style(&item.date).dim(), style(&item.title).bold());
        println!("  ID: {} | {}", item.id, item.download_name());
        println!("  {}", excerpt(&item.content));
    }
    Ok(())
}

/// List notices
pub fn list_notices(session: &Session) -> Result<()> {
    let notices = session.site.view().notices;
    if notices.is_empty() {
        println!("No notices.");
        return Ok(());
    }

    print_header(notices.len(), "Notices");
    for notice in notices {
        println!(
            "\n{} [{}] {}",
            style(&notice.date).dim(),
            notice.category.badge(),
            style(&notice.title).bold()
        );
        println!("  ID: {}", notice.id);
        println!("  {}", excerpt(&notice.content));
    }
    Ok(())
}

/// List closing days
pub fn list_closed_dates(session: &Session) -> Result<()> {
    let dates = session.site.view().closed_dates;
    if dates.is_empty() {
        println!("No closing days.");
        return Ok(());
    }

    print_header(dates.len(), "Closing days");
    for date in dates {
        println!("  {} {} ({})", style(&date.date).bold(), date.reason, date.id);
    }
    Ok(())
}

/// Show the monthly feature with its books
pub fn show_feature(session: &Session) -> Result<()> {
    let view = session.site.view();
    let feature = &view.feature;

    println!("\n{}", style(&feature.title).bold().cyan());
    println!("{}", feature.subtitle);
    println!("{}", "=".repeat(80));
    println!("{}\n", feature.description);
    println!("{}", RichDocument::parse(&feature.content).plain_text());

    let books = view.feature_books();
    if !books.is_empty() {
        println!("\n{}", style("Featured books").bold());
        for book in books {
            println!("  {} / {} ({})", book.title, book.author, book.id);
        }
    }
    Ok(())
}

/// List survey questions
pub fn list_survey(session: &Session) -> Result<()> {
    let questions = session.site.view().survey;
    if questions.is_empty() {
        println!("No survey questions.");
        return Ok(());
    }

    print_header(questions.len(), "Survey questions");
    for question in questions {
        println!("  [{}] {} ({})", question.kind, question.text, question.id);
    }
    Ok(())
}

/// Introduce the staff
pub fn list_librarians(session: &Session) -> Result<()> {
    for librarian in session.site.view().librarians {
        println!("\n{} {}", style(&librarian.name).bold(), style(&librarian.role).dim());
        println!("  {}", librarian.message);
    }
    Ok(())
}

/// Reserve a book or cancel its reservation
pub fn toggle_reserve(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let title = book_title(session, id)?;

    if session.site.toggle_reserve(id) {
        println!("{} Reserved '{}'", style("✓").green().bold(), title);
    } else {
        println!("{} Reservation for '{}' cancelled", style("✓").green().bold(), title);
    }
    Ok(())
}

/// Add a book to the want-to-read list or remove it
pub fn toggle_want_to_read(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let title = book_title(session, id)?;

    if session.site.toggle_want_to_read(id) {
        println!("{} Added '{}' to want-to-read", style("✓").green().bold(), title);
    } else {
        println!("{} Removed '{}' from want-to-read", style("✓").green().bold(), title);
    }
    Ok(())
}

/// Create an item from its template
pub fn add_item(session: &Session, matches: &ArgMatches) -> Result<()> {
    let collection = parse_kind(required(matches, "kind")?)?;
    let id = add_template(session.gateway(), collection, &today_iso())?;
    println!("{} Added {}/{}", style("✓").green().bold(), collection, id);
    Ok(())
}

/// Update fields of an item
pub fn update_item(session: &Session, matches: &ArgMatches) -> Result<()> {
    let collection = parse_kind(required(matches, "kind")?)?;
    let id = required(matches, "id")?;
    let assignments = assignments(matches)?;

    apply_update(session.gateway(), collection, id, &assignments)?;
    println!("{} Updated {}/{}", style("✓").green().bold(), collection, id);
    Ok(())
}

/// Delete an item after confirmation
pub fn delete_item(session: &Session, matches: &ArgMatches) -> Result<()> {
    let collection = parse_kind(required(matches, "kind")?)?;
    let id = required(matches, "id")?;
    let skip_prompt = matches.get_flag("yes");

    let confirm = |prompt: &str| skip_prompt || ask(prompt);
    let outcome = check(session.gateway().delete(collection, id, &confirm))?;

    match outcome {
        DeleteOutcome::Deleted => {
            println!("{} Deleted {}/{}", style("✓").green().bold(), collection, id)
        }
        DeleteOutcome::AlreadyDeleted => println!("{}/{} was already deleted", collection, id),
        DeleteOutcome::Cancelled => println!("Deletion cancelled."),
    }
    Ok(())
}

/// Replace fields of the monthly feature
pub fn update_feature(session: &Session, matches: &ArgMatches) -> Result<()> {
    let assignments = assignments(matches)?;
    let mut feature = session.site.view().feature;
    for (name, value) in &assignments {
        set_feature_field(&mut feature, name, value)?;
    }

    check(session.gateway().replace_feature(&feature))?;
    println!("{} Feature updated", style("✓").green().bold());
    Ok(())
}

/// Append a toolbar tag to an item's content
pub fn insert_tag(session: &Session, matches: &ArgMatches) -> Result<()> {
    let tool: Tool = required(matches, "tool")?.parse()?;
    let collection = parse_kind(required(matches, "kind")?)?;
    let id = matches.get_one::<String>("id").map(String::as_str);

    edit_content(session, collection, id, |content| tool.insert(content))?;
    println!("{} Inserted {} ({})", style("✓").green().bold(), tool, tool.label());
    Ok(())
}

/// Append an image to an item's content
pub fn insert_image(session: &Session, matches: &ArgMatches) -> Result<()> {
    let collection = parse_kind(required(matches, "kind")?)?;
    let url = required(matches, "url")?;
    let id = matches.get_one::<String>("id").map(String::as_str);

    edit_content(session, collection, id, |content| {
        octlib_rich_text::insert_image(content, url)
    })?;
    println!("{} Image inserted", style("✓").green().bold());
    Ok(())
}

/// Follow the store file, reprinting counts whenever another session writes
pub fn watch(session: &Session) -> Result<()> {
    let Some(store) = &session.store else {
        bail!(AppError::store_unavailable("watch").user_message());
    };

    println!(
        "Watching {} (Ctrl-C to stop)",
        style(store.path().display()).bold()
    );
    print_counts(session);

    loop {
        std::thread::sleep(session.watch_interval);
        match store.reload_if_changed() {
            Ok(true) => print_counts(session),
            Ok(false) => {}
            Err(e) => log::warn!("Reload failed: {}", e),
        }
    }
}

fn print_counts(session: &Session) {
    let view = session.site.view();
    println!(
        "[{}] books {} | news {} | notices {} | closed {} | survey {} | feature '{}'",
        chrono::Local::now().format("%H:%M:%S"),
        view.books.len(),
        view.news.len(),
        view.notices.len(),
        view.closed_dates.len(),
        view.survey.len(),
        view.feature.title
    );
}

/// Creates the template item for `collection`, dated `date` where relevant
fn add_template(gateway: &MutationGateway, collection: Collection, date: &str) -> Result<String> {
    let result = match collection {
        Collection::Books => gateway.add_entity(&defaults::new_book()),
        Collection::News => gateway.add_entity(&defaults::new_news_item(date)),
        Collection::Notices => gateway.add_entity(&defaults::new_notice(date)),
        Collection::ClosedDates => gateway.add_entity(&defaults::new_closed_date(date)),
        Collection::Survey => gateway.add_entity(&defaults::new_survey_question()),
        Collection::Features => bail!("The feature is a single document; use feature-set"),
    };
    check(result)
}

fn apply_update(
    gateway: &MutationGateway,
    collection: Collection,
    id: &str,
    assignments: &[(String, String)],
) -> Result<()> {
    let result = match collection {
        Collection::Books => gateway.update(id, &build_patch::<BookPatch>(assignments)?),
        Collection::News => gateway.update(id, &build_patch::<NewsPatch>(assignments)?),
        Collection::Notices => gateway.update(id, &build_patch::<NoticePatch>(assignments)?),
        Collection::ClosedDates => {
            gateway.update(id, &build_patch::<ClosedDatePatch>(assignments)?)
        }
        Collection::Survey => {
            gateway.update(id, &build_patch::<SurveyQuestionPatch>(assignments)?)
        }
        Collection::Features => bail!("The feature is a single document; use feature-set"),
    };
    check(result)
}

fn build_patch<P: Patch + Default>(assignments: &[(String, String)]) -> Result<P> {
    let mut patch = P::default();
    for (name, value) in assignments {
        patch.set_field(name, value).map_err(|e| anyhow!(e))?;
    }
    Ok(patch)
}

fn set_feature_field(feature: &mut MonthlyFeature, name: &str, value: &str) -> Result<()> {
    match name {
        "title" => feature.title = value.to_string(),
        "subtitle" => feature.subtitle = value.to_string(),
        "description" => feature.description = value.to_string(),
        "content" => feature.content = value.to_string(),
        "imageUrl" => feature.image_url = value.to_string(),
        "books" => {
            feature.books = value
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        }
        other => bail!("the feature has no field '{}'", other),
    }
    Ok(())
}

/// Rewrites the rich text `content` field of one item
fn edit_content<F>(session: &Session, collection: Collection, id: Option<&str>, edit: F) -> Result<()>
where
    F: FnOnce(&str) -> String,
{
    let view = session.site.view();
    let gateway = session.gateway();

    let result = match collection {
        Collection::Features => {
            let mut feature = view.feature;
            feature.content = edit(&feature.content);
            gateway.replace_feature(&feature)
        }
        Collection::Notices => {
            let id = id.context("A notice id is required")?;
            let notice = view
                .notices
                .iter()
                .find(|n| n.id == id)
                .ok_or_else(|| anyhow!("No notice with id {}", id))?;
            let patch = NoticePatch {
                content: Some(edit(&notice.content)),
                ..Default::default()
            };
            gateway.update(id, &patch)
        }
        Collection::News => {
            let id = id.context("A newsletter id is required")?;
            let item = view
                .news
                .iter()
                .find(|n| n.id == id)
                .ok_or_else(|| anyhow!("No newsletter with id {}", id))?;
            let patch = NewsPatch {
                content: Some(edit(&item.content)),
                ..Default::default()
            };
            gateway.update(id, &patch)
        }
        other => bail!("{} have no rich text content", other),
    };
    check(result)
}

/// Turns a failed store call into the message shown to the user
fn check<T>(result: SyncResult<T>) -> Result<T> {
    result.map_err(|e| {
        log::warn!("{}", e);
        anyhow!(AppError::from(e).user_message())
    })
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} is required", name))
}

fn parse_kind(raw: &str) -> Result<Collection> {
    raw.parse::<Collection>().map_err(|e| anyhow!(e))
}

fn assignments(matches: &ArgMatches) -> Result<Vec<(String, String)>> {
    matches
        .get_many::<String>("fields")
        .into_iter()
        .flatten()
        .map(String::as_str)
        .map(parse_assignment)
        .collect()
}

/// Splits `field=value` at the first `=`
fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("missing field name in '{}'", raw);
    }
    Ok((name.to_string(), value.to_string()))
}

fn book_title(session: &Session, id: &str) -> Result<String> {
    session
        .site
        .view()
        .book(id)
        .map(|book| book.title.clone())
        .ok_or_else(|| anyhow!("No book with id {}", id))
}

fn ask(prompt: &str) -> bool {
    print!("{} (y/N) ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}

fn print_header(count: usize, title: &str) {
    println!("\n{} {}", style(count).bold().cyan(), title);
    println!("{}", "=".repeat(80));
}

/// First characters of a rich text field, as plain text
fn excerpt(content: &str) -> String {
    RichDocument::parse(content).excerpt(EXCERPT_CHARS)
}
