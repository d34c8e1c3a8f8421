#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for the surat mail backend

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use surat_client::{
    ActivityViewer, ApiClient, AttachmentView, Category, ClientConfig, ComposeForm, Confirm,
    Error, FileTokenStore, Gate, LoginForm, MailboxKind, MailboxPage, ReadStatus, RegisterForm,
    Route, SelectedFile, SessionContext, StatusFilter, Surat, User,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "surat-cli")]
#[command(about = "Send and read surat from the command line")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SURAT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "SURAT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List received mail
    Inbox {
        /// all, read or unread
        #[arg(long, default_value = "all", value_parser = parse_filter)]
        status: StatusFilter,

        /// Match subject or body
        #[arg(long)]
        search: Option<String>,
    },

    /// List sent mail
    Sent {
        /// Match subject or body
        #[arg(long)]
        search: Option<String>,
    },

    /// Open a mail (marks unread inbox mail as read)
    Show {
        id: String,

        /// Look in sent mail instead of the inbox
        #[arg(long)]
        sent: bool,
    },

    /// Flip the read status of an inbox mail
    Toggle { id: String },

    /// Mark an inbox mail as unread
    MarkUnread { id: String },

    /// Delete a mail
    Delete {
        id: String,

        /// Look in sent mail instead of the inbox
        #[arg(long)]
        sent: bool,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// List users that can receive mail
    Users,

    /// Write and send a mail
    Compose {
        /// Recipient email
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: String,

        #[arg(long, default_value = "")]
        body: String,

        /// resmi (formal) or "tidak resmi" (informal)
        #[arg(long, default_value = "tidak resmi", value_parser = parse_category)]
        category: Category,

        /// PDF attachment (required for formal mail)
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Show the activity log
    Activity {
        /// Expand entry details
        #[arg(long)]
        details: bool,
    },
}

fn parse_filter(s: &str) -> Result<StatusFilter, String> {
    s.parse()
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

struct App {
    client: ApiClient,
    session: SessionContext,
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ClientConfig::from_env()?;
    let store = Arc::new(FileTokenStore::new(&config.session_file));
    let session = SessionContext::new(store.clone());
    session.hydrate().await?;
    let app = App {
        client: ApiClient::from_config(&config, store),
        session,
        json: args.json,
    };

    match args.command {
        Command::Login { email, password } => cmd_login(&app, email, password).await,
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            let form = RegisterForm {
                name,
                email,
                password,
                confirm_password,
            };
            cmd_register(&app, &form).await
        }
        Command::Logout => {
            app.session.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => cmd_whoami(&app).await,
        Command::Inbox { status, search } => {
            cmd_list(&app, MailboxKind::Inbox, status, search.as_deref()).await
        }
        Command::Sent { search } => {
            cmd_list(&app, MailboxKind::Sent, StatusFilter::All, search.as_deref()).await
        }
        Command::Show { id, sent } => cmd_show(&app, &id, sent).await,
        Command::Toggle { id } => cmd_toggle(&app, &id).await,
        Command::MarkUnread { id } => cmd_mark_unread(&app, &id).await,
        Command::Delete { id, sent, yes } => cmd_delete(&app, &id, sent, yes).await,
        Command::Users => cmd_users(&app).await,
        Command::Compose {
            to,
            subject,
            body,
            category,
            pdf,
        } => cmd_compose(&app, to, subject, body, category, pdf).await,
        Command::Activity { details } => cmd_activity(&app, details).await,
    }
}

/// Refuse pages that need a session when there is none.
async fn require(app: &App, route: Route) -> anyhow::Result<User> {
    match app.session.gate(route).await {
        Gate::Allow => Ok(app.session.require_user().await?),
        Gate::Pending | Gate::Redirect(_) => {
            anyhow::bail!("Not logged in. Run `surat-cli login` first.")
        }
    }
}

async fn cmd_login(app: &App, email: String, password: String) -> anyhow::Result<()> {
    let form = LoginForm::new(email, password);
    form.submit(&app.client, &app.session).await?;
    let user = app.session.require_user().await?;
    println!("Logged in as {}.", user.label());
    Ok(())
}

async fn cmd_register(app: &App, form: &RegisterForm) -> anyhow::Result<()> {
    form.submit(&app.client).await?;
    println!("Registration successful. You can now log in.");
    Ok(())
}

async fn cmd_whoami(app: &App) -> anyhow::Result<()> {
    let user = require(app, Route::Inbox).await?;
    if app.json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("{}", user.label());
    }
    Ok(())
}

const fn route_for(kind: MailboxKind) -> Route {
    match kind {
        MailboxKind::Inbox => Route::Inbox,
        MailboxKind::Sent => Route::Sent,
    }
}

async fn load_page(app: &App, page: MailboxPage) -> anyhow::Result<MailboxPage> {
    require(app, route_for(page.kind())).await?;
    let mut page = page;
    page.refresh(&app.client).await;
    if let Some(msg) = page.error() {
        anyhow::bail!(msg.to_string());
    }
    Ok(page)
}

async fn cmd_list(
    app: &App,
    kind: MailboxKind,
    status: StatusFilter,
    search: Option<&str>,
) -> anyhow::Result<()> {
    let page = MailboxPage::new(kind)
        .with_filter(status)
        .with_search(search.unwrap_or_default());
    let page = load_page(app, page).await?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(page.items())?);
    } else {
        print_mail_table(kind, page.items());
    }
    Ok(())
}

async fn cmd_show(app: &App, id: &str, sent: bool) -> anyhow::Result<()> {
    let kind = if sent {
        MailboxKind::Sent
    } else {
        MailboxKind::Inbox
    };
    let mut page = load_page(app, MailboxPage::new(kind)).await?;
    let surat = page
        .find(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No mail with id {id} in {kind}"))?;
    page.open(&app.client, surat).await;

    let Some(opened) = page.detail().selected() else {
        anyhow::bail!("Mail {id} could not be opened");
    };
    if app.json {
        println!("{}", serde_json::to_string_pretty(opened)?);
    } else {
        print_mail_detail(opened, page.detail().attachment_view(false).as_ref());
    }
    Ok(())
}

async fn cmd_toggle(app: &App, id: &str) -> anyhow::Result<()> {
    let mut page = load_page(app, MailboxPage::inbox()).await?;
    let status = page
        .toggle_read(&app.client, id)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to change mail status.")))?;
    println!("Mail {id} is now {}.", status_label(status));
    Ok(())
}

async fn cmd_mark_unread(app: &App, id: &str) -> anyhow::Result<()> {
    let mut page = load_page(app, MailboxPage::inbox()).await?;
    let surat = page
        .find(id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No mail with id {id} in inbox"))?;
    if surat.is_unread() {
        println!("Mail {id} is already unread.");
        return Ok(());
    }
    page.open(&app.client, surat).await;
    page.mark_unread_from_detail(&app.client)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to mark mail as unread.")))?;
    println!("Mail {id} is now unread.");
    Ok(())
}

async fn cmd_delete(app: &App, id: &str, sent: bool, yes: bool) -> anyhow::Result<()> {
    let kind = if sent {
        MailboxKind::Sent
    } else {
        MailboxKind::Inbox
    };
    let mut page = load_page(app, MailboxPage::new(kind)).await?;
    let accept_all = |_: &str| true;
    let ask = prompt_yes_no;
    let confirm: &dyn Confirm = if yes { &accept_all } else { &ask };
    match page.delete(&app.client, id, confirm).await {
        Ok(()) => {
            println!("Mail {id} deleted.");
            Ok(())
        }
        Err(Error::Cancelled) => {
            println!("Cancelled.");
            Ok(())
        }
        Err(e) => anyhow::bail!(e.user_message("Failed to delete mail.")),
    }
}

async fn cmd_users(app: &App) -> anyhow::Result<()> {
    let me = require(app, Route::Inbox).await?;
    let mut form = ComposeForm::new();
    form.open(&app.client, &me)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load recipients.")))?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(form.directory())?);
    } else if form.directory().is_empty() {
        println!("No recipients available.");
    } else {
        for user in form.directory() {
            println!("{}", user.label());
        }
    }
    Ok(())
}

async fn cmd_compose(
    app: &App,
    to: String,
    subject: String,
    body: String,
    category: Category,
    pdf: Option<PathBuf>,
) -> anyhow::Result<()> {
    let me = require(app, Route::Inbox).await?;
    let mut form = ComposeForm::new();
    form.open(&app.client, &me)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to load recipients.")))?;

    form.recipient_email = to;
    form.subject = subject;
    form.body = body;
    form.set_category(category);
    if let Some(path) = pdf {
        let file = SelectedFile::from_path(&path).await?;
        if let Err(e) = form.select_attachment(file) {
            if category.requires_attachment() {
                anyhow::bail!("{}: {}", e.field, e.message);
            }
        }
        if !category.requires_attachment() {
            eprintln!("Note: informal mail is sent without the attachment.");
        }
    }

    let mut created: Option<Surat> = None;
    let sent = form
        .submit(&app.client, |surat| created = Some(surat.clone()))
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message("Failed to send mail.")))?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("{}", sent.message.as_deref().unwrap_or("Mail sent."));
        println!("Id: {}", sent.surat.id);
    }
    Ok(())
}

async fn cmd_activity(app: &App, details: bool) -> anyhow::Result<()> {
    require(app, Route::Activity).await?;
    let mut viewer = ActivityViewer::new();
    viewer.refresh(&app.client).await;
    if let Some(msg) = viewer.error() {
        anyhow::bail!(msg.to_string());
    }
    if details {
        viewer.expand_all();
    }

    if app.json {
        println!("{}", serde_json::to_string_pretty(viewer.entries())?);
        return Ok(());
    }
    if viewer.entries().is_empty() {
        println!("No activity recorded.");
        return Ok(());
    }
    for entry in viewer.entries() {
        println!(
            "{}  {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.action_label()
        );
        if let Some(entity) = entry.entity_label() {
            println!("    Entity: {entity}");
        }
        if let Some(ip) = &entry.ip_address {
            println!("    IP: {ip}");
        }
        if viewer.is_expanded(&entry.id) {
            if let Some(pretty) = entry.details_pretty() {
                for line in pretty.lines() {
                    println!("    {line}");
                }
            }
        } else if entry.has_details() {
            println!("    (details hidden, use --details)");
        }
    }
    Ok(())
}

fn prompt_yes_no(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

const fn status_label(status: ReadStatus) -> &'static str {
    match status {
        ReadStatus::Read => "read",
        ReadStatus::Unread => "unread",
    }
}

fn print_mail_table(kind: MailboxKind, mails: &[Surat]) {
    if mails.is_empty() {
        println!("No mail found.");
        return;
    }

    let who = match kind {
        MailboxKind::Inbox => "From",
        MailboxKind::Sent => "To",
    };
    let header = format!(
        "{:<3} {:<24} {:<17} {:<24} {}",
        "", "Id", "Date", who, "Subject"
    );
    println!("{header}");
    println!("{}", "-".repeat(100));

    for mail in mails {
        let party = match kind {
            MailboxKind::Inbox => &mail.sender,
            MailboxKind::Sent => &mail.recipient,
        };
        let marker = format!(
            "{}{}",
            if mail.is_unread() { "*" } else { " " },
            if mail.attachment().is_some() { "@" } else { " " }
        );
        println!(
            "{:<3} {:<24} {:<17} {:<24} {}",
            marker,
            truncate(&mail.id, 24),
            mail.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&party.name, 22),
            truncate(&mail.subject, 40),
        );
        println!("{:<3} {}", "", truncate(&mail.preview(), 96));
    }

    println!("\n{} mail(s)", mails.len());
}

fn print_mail_detail(mail: &Surat, attachment: Option<&AttachmentView>) {
    println!("Subject:  {}", mail.subject);
    println!("From:     {}", mail.sender.label());
    println!("To:       {}", mail.recipient.label());
    println!("Date:     {}", mail.created_at.format("%A, %d %B %Y, %H:%M"));
    println!("Category: {}", mail.category);
    println!("Status:   {}", status_label(mail.status));

    println!("\n--- Body ---\n");
    println!("{}", mail.body.as_deref().filter(|b| !b.is_empty()).unwrap_or("(no content)"));

    match attachment {
        Some(AttachmentView::Preview { url }) => println!("\n--- Attachment ---\n{url}"),
        Some(AttachmentView::Link { notice, .. }) => println!("\n--- Attachment ---\n{notice}"),
        None => {}
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
