use anyhow::{anyhow, bail, Result};

use crate::api::ClientError;
use crate::auth::{GateDecision, Role};
use crate::core::context::AppContext;
use crate::core::time::{display_date, format_calendar_date};
use crate::schemas::achievement::Achievement;
use crate::views::{DashboardView, Notice, ReportsView, ReviewView, StudentAchievementsView};

pub(crate) const USAGE: &str = "usage: prestasi <command>\n\
    \n\
    commands:\n  \
    login <username> <password>\n  \
    logout\n  \
    whoami\n  \
    open <path>\n  \
    achievements\n  \
    submit <id>\n  \
    verify <id> [comments]\n  \
    reject <id> <reason>\n  \
    stats";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Login { username: String, password: String },
    Logout,
    WhoAmI,
    Open { path: String },
    Achievements,
    Submit { id: String },
    Verify { id: String, comments: String },
    Reject { id: String, reason: String },
    Stats,
}

pub(crate) fn parse<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let name = args.next().ok_or_else(|| anyhow!("missing command\n\n{USAGE}"))?;
    let mut required = |what: &str| args.next().ok_or_else(|| anyhow!("{name}: missing {what}"));

    let command = match name.as_str() {
        "login" => Command::Login { username: required("username")?, password: required("password")? },
        "logout" => Command::Logout,
        "whoami" => Command::WhoAmI,
        "open" => Command::Open { path: required("path")? },
        "achievements" => Command::Achievements,
        "submit" => Command::Submit { id: required("achievement id")? },
        "verify" => {
            let id = required("achievement id")?;
            Command::Verify { id, comments: args.collect::<Vec<_>>().join(" ") }
        }
        "reject" => {
            let id = required("achievement id")?;
            Command::Reject { id, reason: args.collect::<Vec<_>>().join(" ") }
        }
        "stats" => Command::Stats,
        other => bail!("unknown command: {other}\n\n{USAGE}"),
    };

    Ok(command)
}

pub(crate) async fn execute(ctx: &AppContext, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let profile = ctx.login(&username, &password).await.map_err(report)?;
            println!("Logged in as {} ({})", profile.full_name, profile.role);
            println!("Home: {}", ctx.navigate("/").target().path());
        }
        Command::Logout => {
            ctx.logout().await;
            println!("Logged out");
        }
        Command::WhoAmI => match ctx.current_user() {
            Some(user) => println!("{} <{}> {} ({})", user.full_name, user.email, user.username, user.role),
            None => println!("Not logged in"),
        },
        Command::Open { path } => match ctx.navigate(&path) {
            GateDecision::Allow(page) => println!("{}", page.path()),
            other => println!("redirect -> {}", other.target().path()),
        },
        Command::Achievements => {
            let listed = match role(ctx)? {
                Role::Student => StudentAchievementsView::mount(ctx).await.map_err(report)?.achievements(),
                _ => ReviewView::mount(ctx).await.map_err(report)?.achievements(),
            };
            if listed.is_empty() {
                println!("No achievements");
            }
            for item in &listed {
                print_achievement(item);
            }
        }
        Command::Submit { id } => {
            let view = StudentAchievementsView::mount(ctx).await.map_err(report)?;
            view.submit(&id).await.map_err(report)?;
            print_notice(view.notice());
        }
        Command::Verify { id, comments } => {
            let view = ReviewView::mount(ctx).await.map_err(report)?;
            view.verify(&id, &comments).await.map_err(report)?;
            print_notice(view.notice());
        }
        Command::Reject { id, reason } => {
            let view = ReviewView::mount(ctx).await.map_err(report)?;
            view.reject(&id, &reason).await.map_err(report)?;
            print_notice(view.notice());
        }
        Command::Stats => {
            if role(ctx)? == Role::Admin {
                let reports = ReportsView::mount(ctx).await.map_err(report)?;
                let stats = reports.statistics();
                println!("students: {}  lecturers: {}", stats.students, stats.lecturers);
                for (status, count) in &stats.achievements {
                    println!("{status:>22}: {count}");
                }
                for top in reports.top_students() {
                    println!("#{} {} ({}): {}", top.rank, top.full_name, top.student_number, top.achievement_count);
                }
            } else {
                let summary = DashboardView::mount(ctx).await.map_err(report)?.summary();
                let counts = summary.counts;
                println!(
                    "draft: {}  submitted: {}  verified: {}  rejected: {}",
                    counts.draft, counts.submitted, counts.verified, counts.rejected
                );
                if let Some(advisees) = summary.advisees {
                    println!("advisees: {advisees}");
                }
            }
        }
    }

    Ok(())
}

fn role(ctx: &AppContext) -> Result<Role> {
    ctx.current_user().map(|user| user.role).ok_or_else(|| anyhow!("Not logged in; run `prestasi login`"))
}

fn report(err: ClientError) -> anyhow::Error {
    match err {
        ClientError::Authorization(GateDecision::RedirectToLogin) => {
            anyhow!("Not logged in; run `prestasi login <username> <password>`")
        }
        other => anyhow!(other.user_message()),
    }
}

fn print_achievement(item: &Achievement) {
    let achieved = item.achieved_date.map(format_calendar_date).unwrap_or_else(|| "-".to_string());
    let submitted = display_date(item.submitted_at.as_deref());
    let owner = item.student_name().unwrap_or("-");
    println!(
        "{:<26} {:<20} {:<12} {:<12} {:<20} {}",
        item.api_id(),
        item.status.label(),
        achieved,
        submitted,
        owner,
        item.title
    );
}

fn print_notice(notice: Option<Notice>) {
    if let Some(notice) = notice {
        println!("{}", notice.message);
    }
}
