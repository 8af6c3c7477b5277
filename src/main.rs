use book_library_client::collection::{EditTarget, SearchMode};
use book_library_client::config;
use book_library_client::config::log::set_global_logging_config;
use book_library_client::item::{Book, BookBuilder, BookId};
use book_library_client::view::{Toast, ToastKind, ViewEvent};
use book_library_client::{Client, Library, LibraryError};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

type App = Library<Client, UnboundedSender<ViewEvent>>;

#[derive(Parser)]
#[command(name = "book-library", about = "Interactive client for the book library service")]
struct Cli {
    /// 서버 주소, 설정 파일과 환경 변수보다 우선한다.
    #[arg(long)]
    base_url: Option<String>,

    /// 관리자 계정으로 로그인한다.
    #[arg(long)]
    admin: bool,
}

/// 한 줄 단위로 입력 받는 명령
#[derive(Parser)]
#[command(name = "", no_binary_name = true, disable_help_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reload the collection from the server
    List,
    /// Add a book to the collection
    Add(BookForm),
    /// Edit a book, unspecified fields keep their value
    Edit {
        id: BookId,
        #[command(flatten)]
        form: BookForm,
    },
    Delete {
        id: BookId,
    },
    /// Search the collection (all, title, author, isbn)
    Find {
        mode: SearchMode,
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Type into the suggestion box
    Type {
        #[arg(num_args = 0..)]
        text: Vec<String>,
    },
    /// Run a full search
    Enter {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Choose a suggestion by its number
    Pick {
        index: usize,
    },
    /// Add a search result to the collection by its number
    Import {
        index: usize,
    },
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
    },
    Logout,
    Whoami,
    Users,
    Stats,
    Quit,
}

#[derive(Args)]
struct BookForm {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    published: Option<NaiveDate>,
    #[arg(long)]
    pages: Option<u32>,
}

impl BookForm {
    fn apply(self, mut builder: BookBuilder) -> Book {
        if let Some(title) = self.title {
            builder = builder.title(title);
        }
        if let Some(author) = self.author {
            builder = builder.author(author);
        }
        if let Some(isbn) = self.isbn {
            builder = builder.isbn(isbn);
        }
        if let Some(published) = self.published {
            builder = builder.publish_date(published);
        }
        if let Some(pages) = self.pages {
            builder = builder.page_count(pages);
        }
        builder.build_unchecked()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    config::load_dotenv();
    let mut config = config::load_config()?;
    if let Some(base_url) = cli.base_url {
        config.client_mut().set_base_url(base_url);
    }
    if cli.admin {
        config.features_mut().admin = true;
    }

    let _guard = set_global_logging_config(config.logger())?;

    let client = Client::with_timeout(config.client().base_url(), config.client().timeout())?;
    info!("Connecting to {}", client.base_url());

    let (sender, receiver) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(receiver));

    let mut library = Library::new(
        Arc::new(client),
        Arc::new(sender),
        config.features(),
        config.search().to_options(),
    );

    if let Ok(None) = library.start().await {
        println!("Please login first: login <username> <password>");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words = split_words(&line);
        if words.is_empty() {
            continue;
        }

        let command = match Line::try_parse_from(words) {
            Ok(line) => line.command,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match run(&mut library, command, cli.admin).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => error!("Command failed: {}", err),
        }
    }

    drop(library);
    printer.await?;
    Ok(())
}

/// 명령을 실행한다. 종료 명령이면 `false`를 반환한다.
async fn run(library: &mut App, command: Command, admin: bool) -> Result<bool, LibraryError> {
    match command {
        Command::List => {
            library.collection_mut().load().await?;
        }
        Command::Add(form) => {
            let collection = library.collection_mut();
            collection.begin_edit(EditTarget::New);
            let saved = collection.save(form.apply(BookBuilder::new())).await;
            collection.cancel_edit();
            saved?;
        }
        Command::Edit { id, form } => {
            let collection = library.collection_mut();
            let Some(current) = collection.begin_edit(EditTarget::Existing(id)) else {
                println!("No book with id {}", id);
                return Ok(true);
            };
            let saved = collection.save(form.apply(current.to_builder())).await;
            collection.cancel_edit();
            saved?;
        }
        Command::Delete { id } => {
            library.collection_mut().delete(id).await?;
        }
        Command::Find { mode, query } => {
            library.collection().search(&query.join(" "), mode).await?;
        }
        Command::Type { text } => {
            library.search_mut()?.input(&text.join(" "));
        }
        Command::Enter { text } => {
            library.search_mut()?.submit(&text.join(" ")).await?;
        }
        Command::Pick { index } => {
            let search = library.search_mut()?;
            match search.suggestions().get(index.wrapping_sub(1)).cloned() {
                Some(suggestion) => search.select(suggestion),
                None => println!("No suggestion #{}", index),
            }
        }
        Command::Import { index } => {
            let results = library.search()?.results();
            match results.get(index.wrapping_sub(1)) {
                Some(suggestion) => {
                    library.importer_mut()?.import(suggestion).await?;
                }
                None => println!("No search result #{}", index),
            }
        }
        Command::Login { username, password } => {
            if admin {
                library.admin_login(&username, &password).await?;
            } else {
                library.login(&username, &password).await?;
            }
        }
        Command::Register { username, email, password, confirm_password } => {
            library.register(&username, &email, &password, &confirm_password).await?;
        }
        Command::Logout => library.logout().await,
        Command::Whoami => match library.session().current() {
            Some(user) => println!("{} ({})", user.username, user.role),
            None => println!("Not logged in"),
        },
        Command::Users => {
            library.admin()?.users().await?;
        }
        Command::Stats => {
            if admin {
                library.admin()?.stats(Local::now().naive_local()).await?;
            } else {
                let stats = library.collection().stats();
                print_event(ViewEvent::Stats(stats));
            }
        }
        Command::Quit => return Ok(false),
    }

    Ok(true)
}

async fn print_events(mut receiver: UnboundedReceiver<ViewEvent>) {
    while let Some(event) = receiver.recv().await {
        print_event(event);
    }
}

fn print_event(event: ViewEvent) {
    match event {
        ViewEvent::Loading(true) => println!("Loading..."),
        ViewEvent::Loading(false) => {}
        ViewEvent::BooksChanged(books) | ViewEvent::BooksFiltered(books) => print_books(&books),
        ViewEvent::Stats(stats) => println!(
            "Books: {}, Authors: {}, Latest: {}",
            stats.total_books,
            stats.total_authors,
            stats.latest_year.map(|year| year.to_string()).unwrap_or_else(|| "-".into()),
        ),
        ViewEvent::LoadFailed(message) => println!("Error loading books: {} (type `list` to retry)", message),
        ViewEvent::SuggestionsShown(suggestions) => {
            for (i, suggestion) in suggestions.iter().enumerate() {
                println!("  {}. {} ({})", i + 1, suggestion.title, suggestion.authors.as_deref().unwrap_or("Unknown Author"));
            }
        }
        ViewEvent::SuggestionsHidden => {}
        ViewEvent::SearchResults(results) => {
            if results.is_empty() {
                println!("No books found");
            }
            for (i, result) in results.iter().enumerate() {
                println!(
                    "[{}] {} / {} / {}",
                    i + 1,
                    result.title,
                    result.authors.as_deref().unwrap_or("Unknown Author"),
                    result.published_year().unwrap_or("-"),
                );
            }
        }
        ViewEvent::SearchFailed(message) => println!("{}", message),
        ViewEvent::SuggestionAdded(key) => println!("Added: {}", key),
        ViewEvent::SessionChanged(Some(user)) => println!("Logged in as {} ({})", user.username, user.role),
        ViewEvent::SessionChanged(None) => println!("Logged out"),
        ViewEvent::Users(users) => {
            for user in users {
                println!(
                    "#{} {} <{}> {}",
                    user.id,
                    user.username,
                    user.email.as_deref().unwrap_or("-"),
                    user.role,
                );
            }
        }
        ViewEvent::AdminStats(stats) => println!(
            "Users: {} (admins: {}, last 7 days: {}), Books: {}",
            stats.total_users, stats.admin_users, stats.recent_registrations, stats.total_books,
        ),
        ViewEvent::Toast(toast) => print_toast(&toast),
    }
}

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("No books found");
    }
    for book in books {
        println!(
            "#{} {} / {} / {}",
            book.id().map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            book.title(),
            book.author(),
            book.isbn().unwrap_or("-"),
        );
    }
}

fn print_toast(toast: &Toast) {
    let tag = match toast.kind {
        ToastKind::Success => "OK",
        ToastKind::Error => "ERROR",
        ToastKind::Warning => "WARN",
    };
    match &toast.message {
        Some(message) => println!("[{}] {}: {}", tag, toast.title, message),
        None => println!("[{}] {}", tag, toast.title),
    }
}

/// 공백으로 단어를 나누되, 큰따옴표로 묶인 부분은 한 단어로 본다.
/// `\` 다음 문자는 공백이나 따옴표라도 그대로 넣는다.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            // 다음 문자를 그대로 넣는다. 마지막 `\`는 문자로 남긴다.
            '\\' => {
                current.push(chars.next().unwrap_or('\\'));
                started = true;
            }
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        words.push(current);
    }
    words
}
