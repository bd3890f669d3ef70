use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::app::AppContext;
use crate::auth::ProfileUpdate;
use crate::catalog::{is_known_category, Catalog, CatalogState, SortOrder};
use crate::checkout::{CardInput, CheckoutWorkflow};
use crate::dashboard::{self, menu_for, AdminDashboard, ModeratorDashboard, StudentDashboard};
use crate::models::{Application, Role, ScholarshipInput, User};
use crate::views;

#[derive(Parser)]
#[command(name = "scholarstream", about = "Browse, apply for and manage scholarships", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login(LoginArgs),
    /// Forget the stored token and session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Update display name or photo
    Profile(ProfileArgs),
    /// Browse the public catalog
    #[command(subcommand)]
    Scholarships(ScholarshipsCmd),
    /// Pay the application fee and apply for a scholarship
    Apply(ApplyArgs),
    /// Dashboard menu and overview for the signed-in role
    Dashboard,
    /// Student views: own applications and reviews
    #[command(subcommand)]
    My(StudentCmd),
    /// Moderator views: all applications and reviews
    #[command(subcommand)]
    Manage(ModeratorCmd),
    /// Admin views: scholarships, users, statistics
    #[command(subcommand)]
    Admin(AdminCmd),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "SCHOLARSTREAM_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ScholarshipsCmd {
    /// Search, filter and sort, one page at a time
    List {
        #[arg(long, default_value = "")]
        search: String,
        /// Full fund, Partial or Self-fund
        #[arg(long)]
        category: Option<String>,
        /// default, fees-asc, fees-desc or newest
        #[arg(long, default_value = "default")]
        sort: SortOrder,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Top scholarships
    Top,
    /// Details and reviews for one scholarship
    Show { id: String },
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    pub scholarship_id: String,
    /// Card token from the payment widget (tok_...)
    #[arg(long)]
    pub card_token: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum StudentCmd {
    Applications,
    Reviews,
    /// Withdraw a pending application
    DeleteApplication { id: String },
    /// Review a completed application
    Review {
        application_id: String,
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
    EditReview {
        id: String,
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
    DeleteReview { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ModeratorCmd {
    Applications,
    /// pending -> processing -> completed
    Advance { id: String },
    Reject { id: String },
    Feedback {
        id: String,
        #[arg(long)]
        text: String,
    },
    Reviews,
    DeleteReview { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AdminCmd {
    Stats,
    Scholarships {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Create a scholarship from a JSON file
    AddScholarship { file: std::path::PathBuf },
    UpdateScholarship { id: String, file: std::path::PathBuf },
    DeleteScholarship { id: String },
    Users,
    SetRole { email: String, role: Role },
    DeleteUser { email: String },
}

pub async fn execute(command: Command, ctx: &mut AppContext) -> Result<()> {
    match command {
        Command::Login(args) => {
            let session = ctx.session.login(&args.email, &args.password).await.context("login failed")?;
            print!("Signed in as {}", views::session(Some(session)));
        }
        Command::Logout => {
            ctx.session.logout().await?;
            println!("Signed out.");
        }
        Command::Whoami => print!("{}", views::session(ctx.session.current())),
        Command::Profile(args) => {
            let update = ProfileUpdate { display_name: args.name, photo_url: args.photo_url };
            let session = ctx.session.update_profile(update).await.context("profile update failed")?;
            print!("{}", views::session(Some(session)));
        }
        Command::Scholarships(cmd) => scholarships(cmd, ctx).await?,
        Command::Apply(args) => apply(args, ctx).await?,
        Command::Dashboard => {
            let role = ctx.session.role();
            print!("{}", views::menu(&menu_for(role)));
            let overview = dashboard::overview(ctx.session.api(), ctx.session.current()).await?;
            println!();
            print!("{}", views::overview(&overview));
        }
        Command::My(cmd) => student(cmd, ctx).await?,
        Command::Manage(cmd) => moderator(cmd, ctx).await?,
        Command::Admin(cmd) => admin(cmd, ctx).await?,
    }
    Ok(())
}

async fn scholarships(cmd: ScholarshipsCmd, ctx: &AppContext) -> Result<()> {
    let catalog = Catalog::new(ctx.session.api());
    match cmd {
        ScholarshipsCmd::List { search, category, sort, page } => {
            if let Some(c) = category.as_deref() {
                if !is_known_category(c) {
                    tracing::warn!(category = %c, "unknown category, sending as-is");
                }
            }
            let mut state = CatalogState::new(ctx.config.catalog.page_size);
            state.set_search(&search);
            state.set_category(category.as_deref());
            state.set_sort(sort);
            state.go_to(page);
            let items = catalog.fetch(&mut state).await?;
            print!("{}", views::scholarship_list(&items, &state));
        }
        ScholarshipsCmd::Top => {
            let items = catalog.top().await?;
            for s in &items {
                println!("{}", views::scholarship_line(s));
            }
        }
        ScholarshipsCmd::Show { id } => match catalog.detail(&id).await? {
            Some(detail) => print!("{}", views::scholarship_detail(&detail)),
            None => println!("Scholarship not found."),
        },
    }
    Ok(())
}

async fn apply(args: ApplyArgs, ctx: &AppContext) -> Result<()> {
    let api = ctx.session.api();
    let session = ctx.session.require()?;
    let scholarship = match api.scholarship(&args.scholarship_id).await {
        Ok(s) => s,
        Err(e) if e.is_not_found() => bail!("scholarship {} not found", args.scholarship_id),
        Err(e) => return Err(e.into()),
    };
    let payments = ctx.payments()?;

    let mut checkout = CheckoutWorkflow::mount(api, &payments, scholarship, Some(session))
        .await
        .context("could not start checkout")?;
    if !checkout.can_submit() {
        print!("{}", views::checkout_outcome(&crate::checkout::CheckoutOutcome::Aborted, None));
        return Ok(());
    }

    let Some(card) = args.card_token.map(CardInput::from_token) else {
        print!("{}", views::card_required(checkout.amount()));
        return Ok(());
    };
    let outcome = checkout.submit(Some(&card)).await;
    tracing::debug!(route = ?outcome.route(), "checkout finished");
    print!("{}", views::checkout_outcome(&outcome, checkout.inline_error()));
    Ok(())
}

fn find_application(items: Vec<Application>, id: &str) -> Result<Application> {
    items.into_iter().find(|a| a.id == id).with_context(|| format!("application {id} not found"))
}

async fn student(cmd: StudentCmd, ctx: &AppContext) -> Result<()> {
    let mut view = StudentDashboard::new(ctx.session.api(), ctx.session.current())?;
    match cmd {
        StudentCmd::Applications => print!("{}", views::applications(&view.applications().await?)),
        StudentCmd::Reviews => print!("{}", views::reviews(&view.reviews().await?)),
        StudentCmd::DeleteApplication { id } => {
            let app = find_application(view.applications().await?, &id)?;
            view.delete_application(&app).await?;
            println!("Application deleted.");
        }
        StudentCmd::Review { application_id, rating, comment } => {
            let app = find_application(view.applications().await?, &application_id)?;
            view.open_review(app)?;
            view.submit_review(rating, &comment).await?;
            println!("Review added.");
        }
        StudentCmd::EditReview { id, rating, comment } => {
            let review = view
                .reviews()
                .await?
                .into_iter()
                .find(|r| r.id == id)
                .with_context(|| format!("review {id} not found"))?;
            view.open_edit(review)?;
            view.submit_edit(rating, &comment).await?;
            println!("Review updated.");
        }
        StudentCmd::DeleteReview { id } => {
            let review = view
                .reviews()
                .await?
                .into_iter()
                .find(|r| r.id == id)
                .with_context(|| format!("review {id} not found"))?;
            view.delete_review(&review).await?;
            println!("Review deleted.");
        }
    }
    Ok(())
}

async fn moderator(cmd: ModeratorCmd, ctx: &AppContext) -> Result<()> {
    let mut view = ModeratorDashboard::new(ctx.session.api(), ctx.session.current())?;
    match cmd {
        ModeratorCmd::Applications => print!("{}", views::applications(&view.applications().await?)),
        ModeratorCmd::Advance { id } => {
            let app = find_application(view.applications().await?, &id)?;
            let next = view.advance(&app).await?;
            println!("Application is now {next}.");
        }
        ModeratorCmd::Reject { id } => {
            let app = find_application(view.applications().await?, &id)?;
            view.reject(&app).await?;
            println!("Application rejected.");
        }
        ModeratorCmd::Feedback { id, text } => {
            let app = find_application(view.applications().await?, &id)?;
            view.open_feedback(app);
            view.submit_feedback(&text).await?;
            println!("Feedback saved.");
        }
        ModeratorCmd::Reviews => print!("{}", views::reviews(&view.reviews().await?)),
        ModeratorCmd::DeleteReview { id } => {
            view.delete_review(&id).await?;
            println!("Review deleted.");
        }
    }
    Ok(())
}

async fn read_scholarship(path: &std::path::Path) -> Result<ScholarshipInput> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid scholarship JSON in {}", path.display()))
}

fn find_user(items: Vec<User>, email: &str) -> Result<User> {
    items
        .into_iter()
        .find(|u| u.email.eq_ignore_ascii_case(email))
        .with_context(|| format!("user {email} not found"))
}

async fn admin(cmd: AdminCmd, ctx: &AppContext) -> Result<()> {
    let view = AdminDashboard::new(ctx.session.api(), ctx.session.current())?;
    match cmd {
        AdminCmd::Stats => print!("{}", views::stats(&view.stats().await?)),
        AdminCmd::Scholarships { page, limit } => {
            let res = view.scholarships(page, limit).await?;
            for s in &res.scholarships {
                println!("{}", views::scholarship_line(s));
            }
            println!("{} scholarships in total", res.total_scholarships);
        }
        AdminCmd::AddScholarship { file } => {
            let input = read_scholarship(&file).await?;
            let id = view.add_scholarship(input).await?;
            println!("Scholarship added{}.", id.map(|i| format!(" ({i})")).unwrap_or_default());
        }
        AdminCmd::UpdateScholarship { id, file } => {
            let input = read_scholarship(&file).await?;
            if view.update_scholarship(&id, &input).await? {
                println!("Scholarship updated.");
            } else {
                println!("No changes.");
            }
        }
        AdminCmd::DeleteScholarship { id } => {
            view.delete_scholarship(&id).await?;
            println!("Scholarship deleted.");
        }
        AdminCmd::Users => print!("{}", views::users(&view.users().await?)),
        AdminCmd::SetRole { email, role } => {
            let user = find_user(view.users().await?, &email)?;
            view.set_role(&user, role).await?;
            println!("{} is now {}.", user.email, role);
        }
        AdminCmd::DeleteUser { email } => {
            let user = find_user(view.users().await?, &email)?;
            view.delete_user(&user).await?;
            println!("User deleted.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_catalog_flags() {
        let cli = Cli::try_parse_from([
            "scholarstream", "scholarships", "list", "--search", "physics", "--sort", "fees-desc", "--page", "2",
        ])
        .unwrap();
        match cli.command {
            Command::Scholarships(ScholarshipsCmd::List { search, sort, page, category }) => {
                assert_eq!(search, "physics");
                assert_eq!(sort, SortOrder::FeesDesc);
                assert_eq!(page, 2);
                assert_eq!(category, None);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn parses_role_argument() {
        let cli = Cli::try_parse_from(["scholarstream", "admin", "set-role", "a@x.com", "moderator"]).unwrap();
        assert!(matches!(cli.command, Command::Admin(AdminCmd::SetRole { role: Role::Moderator, .. })));
    }
}
