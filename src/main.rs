use article_editor::config::{DEFAULT_API_URL, DEFAULT_COMMIT_MESSAGE};
use article_editor::{
    ArticleForm, DeleteOutcome, Editor, EditorError, EditorResult, GitHubContents, SyncClient,
    SyncConfig,
};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "articles", version, about = "Edit article records and push them to GitHub")]
struct Cli {
    /// Local JSON file holding the articles
    #[arg(long, short, env = "ARTICLES_FILE", default_value = "articles.json", global = true)]
    file: PathBuf,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List articles, newest first
    List,

    /// Print one article
    Show {
        /// Position in the list
        index: usize,

        /// Render the body as HTML
        #[arg(long)]
        html: bool,
    },

    /// Create an article and save it locally
    New {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Change an article and save it locally
    Edit {
        /// Position in the list
        index: usize,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Delete an article from the local file
    Delete {
        /// Position in the list
        index: usize,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Upload all articles to a file in a GitHub repository
    Upload(UploadArgs),
}

#[derive(Args)]
struct FormArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    slug: Option<String>,

    /// Main image path
    #[arg(long)]
    image: Option<String>,

    /// Body text, paragraphs separated by a blank line
    #[arg(long, conflicts_with = "body_file")]
    body: Option<String>,

    /// Read the body from a file, or from stdin with `-`
    #[arg(long)]
    body_file: Option<PathBuf>,
}

impl FormArgs {
    fn apply(self, form: &mut ArticleForm) -> EditorResult<()> {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(slug) = self.slug {
            form.slug = slug;
        }
        if let Some(image) = self.image {
            form.main_image = image;
        }
        if let Some(body) = self.body {
            form.body = body;
        }
        if let Some(path) = self.body_file {
            form.body = read_body(&path)?;
        }
        Ok(())
    }
}

#[derive(Args)]
struct UploadArgs {
    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: Option<String>,

    /// Path inside the repository (defaults to the local file name)
    #[arg(long)]
    remote_path: Option<String>,

    /// Access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Commit message
    #[arg(long, default_value = DEFAULT_COMMIT_MESSAGE)]
    message: String,

    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

fn read_body(path: &Path) -> EditorResult<String> {
    if path == Path::new("-") {
        let mut body = String::new();
        io::stdin()
            .read_to_string(&mut body)
            .map_err(|e| EditorError::io(path, e))?;
        return Ok(body);
    }
    std::fs::read_to_string(path).map_err(|e| EditorError::io(path, e))
}

fn confirm_delete(form: &ArticleForm) -> bool {
    eprint!("Delete '{}'? [y/N]: ", form.title);
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn run(cli: Cli) -> EditorResult<String> {
    let file = cli.file;
    let mut editor = Editor::open(&file)?;

    match cli.command {
        Commands::List => {
            for (i, article) in editor.list().iter().enumerate() {
                println!(
                    "{:>3}  {}  {}  {}",
                    i, article.published_at, article.slug, article.title
                );
                let excerpt = article.excerpt();
                if !excerpt.is_empty() {
                    println!("     {}", excerpt.replace('\n', " "));
                }
            }
            Ok(format!(
                "Loaded {} articles from '{}'.",
                editor.list().len(),
                file.display()
            ))
        }
        Commands::Show { index, html } => {
            editor.select_at(index)?;
            let article = &editor.list()[index];
            println!("Title:       {}", article.title);
            println!("Slug:        {}", article.slug);
            println!("Published:   {}", article.published_at);
            println!("Main image:  {}", article.main_image);
            println!();
            if html {
                println!("{}", article.body_html());
            } else {
                println!("{}", editor.form().body);
            }
            Ok(format!("Article {index} of {}.", editor.list().len()))
        }
        Commands::New { form } => {
            editor.create();
            form.apply(editor.form_mut())?;
            editor.save()?;
            Ok(format!("Saved to '{}'.", file.display()))
        }
        Commands::Edit { index, form } => {
            editor.select_at(index)?;
            form.apply(editor.form_mut())?;
            editor.save()?;
            Ok(format!("Saved to '{}'.", file.display()))
        }
        Commands::Delete { index, yes } => {
            editor.select_at(index)?;
            let outcome = editor.delete(|form| yes || confirm_delete(form))?;
            Ok(match outcome {
                DeleteOutcome::Removed(_) => "Article deleted.".to_string(),
                DeleteOutcome::Cancelled => "Delete cancelled.".to_string(),
            })
        }
        Commands::Upload(args) => {
            let remote_path = args.remote_path.unwrap_or_else(|| {
                file.file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default()
            });
            let config = SyncConfig::new()
                .repo(args.repo.unwrap_or_default())
                .remote_path(remote_path)
                .token(args.token.unwrap_or_default())
                .commit_message(args.message)
                .api_url(args.api_url);
            config.validate()?;

            editor.persist()?;
            eprintln!("Uploading...");
            let client = SyncClient::new(GitHubContents::new());
            let report = client.sync_all(&config, editor.list())?;
            Ok(format!(
                "Uploaded {} articles to GitHub ({}:{}).",
                report.pushed, config.repo, config.remote_path
            ))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Controlled by RUST_LOG, falling back to warn (debug with --verbose).
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(status) => println!("{status}"),
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
