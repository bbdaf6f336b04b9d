use std::fmt;
use std::io::Write as _;
use std::sync::Arc;

use quiz_core::model::{Locale, PlayerId, Question, SessionState, find_badge, share_message};
use services::identity::{IdentityProvider, StaticIdentity};
use services::{
    Advance, AnswerFeedback, AppServices, Clock, Collaborators, QuizSettings, SessionCompletion,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuestions { raw: String },
    InvalidLocale { raw: String },
    InvalidDbUrl { raw: String },
    DbDir { dir: String, source: std::io::Error },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuestions { raw } => write!(
                f,
                "invalid --questions value: {raw} (expected 1..={})",
                SessionState::MAX_LIMIT
            ),
            ArgsError::InvalidLocale { raw } => write!(f, "invalid --locale value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::DbDir { dir, source } => write!(f, "cannot create {dir}: {source}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  astro-quiz [play]  [options]   # play one quiz session");
    eprintln!("  astro-quiz stats   [options]   # show progression and badges");
    eprintln!("  astro-quiz export  [options]   # print progression as JSON");
    eprintln!("  astro-quiz reset   [options]   # delete stored progression");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     default sqlite://astro-quiz.sqlite3");
    eprintln!("  --locale <name>       english, hindi, tamil, bengali, marathi, malayalam");
    eprintln!(
        "  --questions <n>       questions per session (1..={}, default {})",
        SessionState::MAX_LIMIT,
        SessionState::DEFAULT_LIMIT
    );
    eprintln!("  --player <id>         play as a signed-in player (default: local guest)");
    eprintln!("  --offline             skip NASA and play the built-in questions only");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASTRO_DB_URL, ASTRO_LOCALE, ASTRO_NASA_API_KEY, ASTRO_TRANSLATE_API_KEY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Stats,
    Export,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "stats" => Some(Self::Stats),
            "export" => Some(Self::Export),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    db_url: String,
    locale: Locale,
    questions: u32,
    player: Option<PlayerId>,
    offline: bool,
}

impl Args {
    /// Defaults with `ASTRO_DB_URL` and `ASTRO_LOCALE` applied.
    fn from_env() -> Self {
        let db_url = std::env::var("ASTRO_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("astro-quiz.sqlite3".into()), normalize_sqlite_url);
        let locale = std::env::var("ASTRO_LOCALE")
            .ok()
            .map_or(Locale::SOURCE, |raw| Locale::parse_or_default(&raw));
        Self {
            db_url,
            locale,
            questions: SessionState::DEFAULT_LIMIT,
            player: None,
            offline: false,
        }
    }

    fn parse(mut self, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = normalize_sqlite_url(value);
                }
                "--locale" => {
                    let value = require_value(args, "--locale")?;
                    self.locale = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLocale { raw: value.clone() })?;
                }
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    self.questions = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| (1..=SessionState::MAX_LIMIT).contains(n))
                        .ok_or_else(|| ArgsError::InvalidQuestions { raw: value.clone() })?;
                }
                "--player" => {
                    let value = require_value(args, "--player")?;
                    let trimmed = value.trim();
                    self.player = (!trimmed.is_empty()).then(|| PlayerId::new(trimmed));
                }
                "--offline" => self.offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(self)
    }

    fn identity(&self) -> Arc<dyn IdentityProvider> {
        match &self.player {
            Some(player) => Arc::new(StaticIdentity::authenticated(player.clone())),
            None => Arc::new(StaticIdentity::guest("local")),
        }
    }

    /// The built-in general-knowledge questions are always part of the pool.
    fn settings(&self) -> QuizSettings {
        QuizSettings::default()
            .with_session_limit(self.questions)
            .with_local_bank(true)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Creates the directory holding a file database; the file itself is created
/// on connect.
fn ensure_db_dir(db_url: &str) -> Result<(), ArgsError> {
    if db_url.contains(":memory:") || db_url.contains("mode=memory") {
        return Ok(());
    }
    let path = db_url
        .strip_prefix("sqlite://")
        .map(|rest| rest.split('?').next().unwrap_or(rest))
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    match std::path::Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| ArgsError::DbDir {
                dir: dir.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}

//
// ─── PLAY ─────────────────────────────────────────────────────────────────────
//

/// Maps a typed option number onto its text; anything else is the answer itself.
fn resolve_answer(question: &Question, input: &str) -> String {
    let trimmed = input.trim();
    if !question.is_free_text() {
        let picked = trimmed
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| question.options().get(index));
        if let Some(option) = picked {
            return option.clone();
        }
    }
    trimmed.to_string()
}

fn badge_label(id: &str) -> String {
    find_badge(id).map_or_else(
        || id.to_string(),
        |badge| format!("{} {}", badge.icon, badge.name),
    )
}

fn print_question(question: &Question, number: u32, limit: u32) {
    println!();
    println!("Question {number}/{limit} [{}]", question.category());
    println!("{}", question.prompt());
    if let Some(media) = question.media() {
        println!("  ({})", media.url());
    }
    for (index, option) in question.options().iter().enumerate() {
        println!("  {}. {option}", index + 1);
    }
}

fn print_feedback(feedback: &AnswerFeedback) {
    if feedback.is_correct {
        println!("Correct!");
    } else {
        println!("Not quite. The answer was: {}", feedback.correct_answer);
    }
    if !feedback.explanation.is_empty() {
        println!("{}", feedback.explanation);
    }
    println!(
        "Score {} | streak {} | {} left",
        feedback.score, feedback.streak, feedback.remaining
    );
    for badge in &feedback.newly_earned {
        println!("Badge unlocked: {}", badge_label(&badge.id));
    }
    if !feedback.persisted {
        println!("(progress could not be saved; it is kept for this session only)");
    }
}

fn print_completion(done: &SessionCompletion) {
    let summary = &done.summary;
    println!();
    println!(
        "Session complete: {}/{} correct ({}%), best streak {}",
        summary.score,
        summary.answered,
        summary.accuracy_percent(),
        summary.best_streak
    );
}

async fn prompt_line<R>(input: &mut Lines<R>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        match input.next_line().await? {
            Some(line) if line.trim().is_empty() => {}
            other => return Ok(other),
        }
    }
}

async fn play<R>(
    services: &AppServices,
    locale: Locale,
    input: &mut Lines<R>,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let quiz = services.quiz();
    let mut session = quiz.start_session(locale).await?;

    while let Some(question) = session.current_question().cloned() {
        print_question(
            &question,
            session.state().answered() + 1,
            session.state().limit(),
        );
        let Some(line) = prompt_line(input).await? else {
            debug!("input closed, leaving session early");
            println!();
            return Ok(());
        };

        let answer = resolve_answer(&question, &line);
        let Some(feedback) = quiz.submit_answer(&mut session, &answer).await else {
            continue;
        };
        print_feedback(&feedback);

        if let Advance::Completed(done) = quiz.advance(&mut session).await? {
            print_completion(&done);
            break;
        }
    }

    stats(services, locale).await
}

//
// ─── PROGRESSION ──────────────────────────────────────────────────────────────
//

async fn stats(
    services: &AppServices,
    locale: Locale,
) -> Result<(), Box<dyn std::error::Error>> {
    let progression = services.progression();
    let progress = progression.load().await?;
    let streak = progression.streak().await?;
    let record = &progress.record;

    println!();
    println!(
        "Player {}: {}/{} correct overall",
        progression.identity().player_id,
        record.correct_answers(),
        record.total_questions()
    );
    println!(
        "Daily streak {} ({:?}), best {}",
        streak.streak, streak.status, streak.best
    );
    if progress.badges.is_empty() {
        println!("No badges yet.");
    } else {
        for badge in progress.badges.iter() {
            println!(
                "  {} (since {})",
                badge_label(&badge.id),
                badge.earned_at.date_naive()
            );
        }
    }
    if let Some(next) = progression.next_badge().await? {
        println!(
            "Next badge: {} {}/{}",
            next.badge.name, next.progress, next.target
        );
    }
    if record.total_questions() > 0 {
        println!();
        println!("{}", share_message(record, locale));
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::from_env()
        .parse(&mut argv.into_iter())
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    ensure_db_dir(&parsed.db_url)?;
    let collaborators = Collaborators::from_env(parsed.identity(), parsed.offline);
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::system(),
        parsed.settings(),
        collaborators,
    )
    .await?;

    match cmd {
        Command::Play => {
            let mut input = BufReader::new(tokio::io::stdin()).lines();
            play(&services, parsed.locale, &mut input).await
        }
        Command::Stats => stats(&services, parsed.locale).await,
        Command::Export => {
            println!("{}", services.progression().export_json().await?);
            Ok(())
        }
        Command::Reset => {
            services.progression().reset().await?;
            println!("Progress cleared for {}.", parsed.identity().current().player_id);
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Category, QuestionDraft};
    use services::content::OfflineSource;
    use services::translate::IdentityTranslator;
    use storage::repository::Storage;

    fn defaults() -> Args {
        Args {
            db_url: "sqlite::memory:".into(),
            locale: Locale::English,
            questions: SessionState::DEFAULT_LIMIT,
            player: None,
            offline: false,
        }
    }

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        defaults().parse(&mut args.iter().map(|s| (*s).to_string()))
    }

    fn planets() -> Question {
        QuestionDraft {
            id: "apod_planets".into(),
            category: Category::Apod,
            prompt: "How many planets?".into(),
            options: vec!["7".into(), "8".into(), "9".into()],
            correct_answer: "8".into(),
            explanation: String::new(),
            media: None,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn parses_every_flag() {
        let args = parse(&[
            "--db",
            "sqlite::memory:",
            "--locale",
            "tamil",
            "--questions",
            "7",
            "--player",
            "ada",
            "--offline",
        ])
        .unwrap();

        assert_eq!(args.locale, Locale::Tamil);
        assert_eq!(args.questions, 7);
        assert_eq!(args.player, Some(PlayerId::new("ada")));
        assert!(args.offline);
        assert!(args.settings().include_local_bank);
        assert!(args.identity().current().can_sync());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--questions", "0"]),
            Err(ArgsError::InvalidQuestions { .. })
        ));
        assert!(matches!(
            parse(&["--questions", "51"]),
            Err(ArgsError::InvalidQuestions { .. })
        ));
        assert!(matches!(
            parse(&["--locale", "klingon"]),
            Err(ArgsError::InvalidLocale { .. })
        ));
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(parse(&["--wat"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn local_bank_is_mixed_in_with_or_without_offline() {
        assert!(parse(&[]).unwrap().settings().include_local_bank);
        assert!(parse(&["--offline"]).unwrap().settings().include_local_bank);
    }

    #[test]
    fn blank_player_plays_as_guest() {
        let args = parse(&["--player", "  "]).unwrap();
        let identity = args.identity().current();
        assert!(identity.player_id.is_guest());
        assert!(!identity.can_sync());
    }

    #[test]
    fn normalize_keeps_memory_and_absolute_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/quiz.db".into()),
            "sqlite:///tmp/quiz.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/quiz.db".into()),
            "sqlite:///tmp/quiz.db"
        );
    }

    #[test]
    fn memory_databases_need_no_directory() {
        assert!(ensure_db_dir("sqlite::memory:").is_ok());
        assert!(ensure_db_dir("sqlite:file:memdb?mode=memory&cache=shared").is_ok());
        assert!(matches!(
            ensure_db_dir("sqlite://"),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn option_numbers_resolve_to_option_text() {
        let question = planets();
        assert_eq!(resolve_answer(&question, " 2 "), "8");
        assert_eq!(resolve_answer(&question, "4"), "4");
        assert_eq!(resolve_answer(&question, "0"), "0");
        assert_eq!(resolve_answer(&question, "Eight"), "Eight");
    }

    #[test]
    fn unknown_badge_ids_print_verbatim() {
        assert_eq!(badge_label("retired_badge"), "retired_badge");
        assert!(badge_label("first_steps").contains(find_badge("first_steps").unwrap().name));
    }

    #[tokio::test]
    async fn play_reads_answers_until_completion() {
        let storage = Storage::in_memory();
        let collaborators = Collaborators {
            source: Arc::new(OfflineSource),
            translator: Arc::new(IdentityTranslator),
            identity: Arc::new(StaticIdentity::authenticated(PlayerId::new("ada"))),
            remote: None,
        };
        let services = AppServices::new(
            &storage,
            Clock::system(),
            QuizSettings::default().with_session_limit(2),
            collaborators,
        );

        // Blank lines are skipped; the fallback question's answer is "8".
        let script: &[u8] = b"\n8\nnine\n";
        let mut input = BufReader::new(script).lines();
        play(&services, Locale::English, &mut input).await.unwrap();

        let record = services.progression().load().await.unwrap().record;
        assert_eq!(record.total_questions(), 2);
        assert_eq!(record.correct_answers(), 1);
    }
}
