//! `team` command handlers.

use clap::Subcommand;
use meetpoint_core::normalize_invite_code;
use meetpoint_db::TeamSummaryRow;
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum TeamCommands {
    /// Create a team and print its invite code
    Create {
        #[arg(long)]
        name: String,
        /// Your user id
        #[arg(long = "as")]
        created_by: String,
    },
    /// Look up a team by invite code
    Join {
        code: String,
    },
    /// Show a team and how many members have saved a location
    Show {
        team: Uuid,
    },
    /// List the teams you have saved a location in
    Mine {
        #[arg(long)]
        user: String,
    },
}

pub(crate) async fn run(pool: &sqlx::PgPool, command: TeamCommands) -> anyhow::Result<()> {
    match command {
        TeamCommands::Create { name, created_by } => {
            let name = name.trim();
            anyhow::ensure!(!name.is_empty(), "team name must not be blank");
            let team = meetpoint_db::create_team(pool, name, created_by.trim()).await?;
            println!("created team \"{}\"", team.name);
            println!("  id:   {}", team.id);
            println!("  code: {}", team.code);
        }
        TeamCommands::Join { code } => {
            let code = normalize_invite_code(&code)?;
            let team = meetpoint_db::get_team_by_code(pool, &code)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no team with invite code {code}"))?;
            println!("team \"{}\" ({})", team.name, team.id);
            println!("use --team {} with `locations` and `find`", team.id);
        }
        TeamCommands::Show { team } => {
            let summary = meetpoint_db::get_team(pool, team)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no team with id {team}"))?;
            println!("{}", format_summary(&summary));
        }
        TeamCommands::Mine { user } => {
            let user = user.trim();
            anyhow::ensure!(!user.is_empty(), "user must not be blank");
            let teams = meetpoint_db::list_member_teams(pool, user).await?;
            tracing::debug!(user, count = teams.len(), "loaded member teams");
            if teams.is_empty() {
                println!("no teams yet; save a location with `locations add`");
            }
            for summary in &teams {
                println!("{}", format_summary(summary));
            }
        }
    }
    Ok(())
}

fn format_summary(summary: &TeamSummaryRow) -> String {
    let members = if summary.member_count == 1 {
        "1 member".to_string()
    } else {
        format!("{} members", summary.member_count)
    };
    format!(
        "{}  {}  \"{}\"  {members}",
        summary.team.id, summary.team.code, summary.team.name
    )
}
