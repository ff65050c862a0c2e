use meetpoint_core::Session;
use meetpoint_planner::{FindOutcome, FindRequest, MeetingPlanner, RankedResult};

/// Runs a find for `session` and prints the ranked venues.
///
/// # Errors
///
/// Returns an error if the stored locations cannot be read, nobody in the
/// team has a location yet, or the request is out of range.
pub(crate) async fn run_find(
    planner: &MeetingPlanner,
    session: &Session,
    request: &FindRequest,
    json: bool,
) -> anyhow::Result<()> {
    let outcome = planner.find_for_member(session, request).await?;
    tracing::debug!(
        team_id = %session.team_id,
        user_id = %session.user_id,
        results = outcome.results().len(),
        "find finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("{}", outcome.message());
    if let FindOutcome::Found { results, .. } = &outcome {
        println!();
        println!(
            "{:<5}{:<8}{:<8}{:<32}ADDRESS",
            "RANK", "MAX", "AVG", "NAME"
        );
        for (rank, result) in results.iter().enumerate() {
            println!("{}", format_row(rank + 1, result));
        }
        if results.iter().any(RankedResult::has_estimates) {
            println!();
            println!("~ some travel times could not be looked up and count as the full budget");
        }
    }
    Ok(())
}

fn format_row(rank: usize, result: &RankedResult) -> String {
    let flag = if result.has_estimates() { "~" } else { "" };
    let name: String = result.candidate.name.chars().take(30).collect();
    format!(
        "{:<5}{:<8}{:<8}{:<32}{}",
        rank,
        format!("{}m{flag}", result.max_time_minutes),
        format!("{}m", result.avg_time_minutes),
        name,
        result.candidate.address
    )
}
