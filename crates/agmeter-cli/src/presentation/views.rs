use agmeter_runtime::UsageReport;
use agmeter_store::{SessionRow, SourceStats};
use agmeter_types::Period;
use owo_colors::OwoColorize;

use super::formatters::{format_datetime, format_datetime_short, format_duration, format_tokens};

pub struct ViewOptions {
    pub color: bool,
}

impl ViewOptions {
    fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().blue().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim_note(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Usage report for one agent, in the layout shared with the combined view.
pub fn render_usage(agent: &str, period: Period, report: &UsageReport, opts: &ViewOptions) {
    println!("\n{} Usage Statistics - {}", title_case(agent), title_case(period.as_str()));
    println!("{}", "=".repeat(60));

    println!("\n{}", opts.heading("Last Session"));
    match &report.last_session {
        Some(session) => render_last_session(session),
        None => println!("  {}", opts.dim_note("No sessions in this period")),
    }

    println!("\n{}", opts.heading("Summary"));
    render_summary(report, &opts.dim_note("Never synced"));

    if !report.daily_summaries.is_empty() {
        println!("\n{}", opts.heading("Daily Summary (last 7 days)"));
        println!("  {:<12} {:>10} {:>12} {:>12}", "Date", "Sessions", "Duration", "Tokens");
        println!("  {}", "-".repeat(52));
        for day in &report.daily_summaries {
            println!(
                "  {:<12} {:>10} {:>12} {:>12}",
                day.date,
                day.session_count,
                format_duration(day.total_time),
                format_tokens(day.total_tokens)
            );
        }
    }

    if !report.weekly_summaries.is_empty() {
        println!("\n{}", opts.heading("Weekly Summary (last 30 days)"));
        println!("  {:<12} {:>10} {:>12} {:>12}", "Week", "Sessions", "Duration", "Tokens");
        println!("  {}", "-".repeat(52));
        for week in &report.weekly_summaries {
            println!(
                "  {:<12} {:>10} {:>12} {:>12}",
                week.week_start,
                week.session_count,
                format_duration(week.total_time),
                format_tokens(week.total_tokens)
            );
        }
    }

    render_top_models(report, opts);

    println!("\n{}", "=".repeat(60));
}

/// Combined report across sources, with the per-agent breakdown table.
pub fn render_all_stats(
    period: Period,
    report: &UsageReport,
    per_source: &[SourceStats],
    opts: &ViewOptions,
) {
    println!("\nCombined Usage Statistics - {}", title_case(period.as_str()));
    println!("{}", "=".repeat(60));

    println!("\n{}", opts.heading("Per-Agent Breakdown"));
    println!(
        "  {:<12} {:>10} {:>12} {:>24} {:>10}",
        "Agent", "Sessions", "Time", "Tokens (in/out/crea/read)", "Messages"
    );
    println!("  {}", "-".repeat(74));

    let mut total_sessions = 0;
    let mut total_time = 0;
    let mut total_input = 0;
    let mut total_output = 0;
    let mut total_cache_creation = 0;
    let mut total_cache_read = 0;
    let mut total_messages = 0;

    for source in per_source {
        println!(
            "  {:<12} {:>10} {:>12} {:>24} {:>10}",
            source_label(&source.source),
            source.session_count,
            format_duration(source.total_time),
            token_breakdown(
                source.total_input_tokens,
                source.total_output_tokens,
                source.total_cache_creation,
                source.total_cache_read
            ),
            source.total_messages
        );
        total_sessions += source.session_count;
        total_time += source.total_time;
        total_input += source.total_input_tokens;
        total_output += source.total_output_tokens;
        total_cache_creation += source.total_cache_creation;
        total_cache_read += source.total_cache_read;
        total_messages += source.total_messages;
    }

    println!("  {}", "-".repeat(74));
    println!(
        "  {:<12} {:>10} {:>12} {:>24} {:>10}",
        "Total",
        total_sessions,
        format_duration(total_time),
        token_breakdown(total_input, total_output, total_cache_creation, total_cache_read),
        total_messages
    );

    println!("\n{}", opts.heading("Summary"));
    render_summary(report, &opts.dim_note("Never synced"));
    println!("  Unique Projects:    {}", report.unique_projects);

    render_top_models(report, opts);

    println!(
        "\n{}",
        opts.heading(&format!("Last {} Sessions", report.recent_sessions.len()))
    );
    if report.recent_sessions.is_empty() {
        println!("  {}", opts.dim_note("No data"));
    } else {
        for (i, session) in report.recent_sessions.iter().enumerate() {
            render_recent_session(i + 1, session);
        }
    }

    println!("\n{}", "=".repeat(60));
}

fn render_last_session(session: &SessionRow) {
    println!("  ID:         {}", session.external_id);
    println!("  Start:      {}", format_datetime(session.started_at));
    println!("  Project:    {}", session.project_path);
    println!("  Model:      {}", session.model);
    println!("  Provider:   {}", session.provider);
    if let Some(ended_at) = session.ended_at {
        println!("  End:        {}", format_datetime(ended_at));
        println!("  Duration:   {}", format_duration(ended_at - session.started_at));
    }
    println!(
        "  Tokens:     {} (in: {}, out: {}, cache: {}/{})",
        format_tokens(session.total_tokens),
        format_tokens(session.input_tokens),
        format_tokens(session.output_tokens),
        format_tokens(session.cache_creation_tokens),
        format_tokens(session.cache_read_tokens)
    );
    println!("  Messages:   {}", session.message_count);
}

fn render_summary(report: &UsageReport, never_synced: &str) {
    println!("  Total Sessions:     {}", report.totals.session_count);
    println!(
        "  Total Session Time: {}",
        format_duration(report.totals.total_session_time)
    );
    println!(
        "  Total Tokens:       {} (in: {}, out: {}, cache: {}/{})",
        format_tokens(report.totals.total_tokens),
        format_tokens(report.totals.total_input_tokens),
        format_tokens(report.totals.total_output_tokens),
        format_tokens(report.totals.total_cache_creation),
        format_tokens(report.totals.total_cache_read)
    );
    println!("  Total Messages:     {}", report.total_messages);
    println!("  Total Tool Calls:   {}", report.total_tool_calls);
    if report.last_sync_time > 0 {
        println!("  Last Sync:          {}", format_datetime(report.last_sync_time));
    } else {
        println!("  Last Sync:          {}", never_synced);
    }
}

fn render_top_models(report: &UsageReport, opts: &ViewOptions) {
    println!("\n{}", opts.heading("Top Models (by session count)"));
    if report.top_models.is_empty() {
        println!("  {}", opts.dim_note("No data"));
    } else {
        for (i, model) in report.top_models.iter().enumerate() {
            println!("  {}. {} - {} sessions", i + 1, model.model, model.session_count);
        }
    }
}

fn render_recent_session(rank: usize, session: &SessionRow) {
    let model = if session.model.is_empty() {
        "(unknown)"
    } else {
        &session.model
    };
    let duration = match session.ended_at {
        Some(ended_at) => format_duration(ended_at - session.started_at),
        None => "-".to_string(),
    };
    println!(
        "  {}. {} {} | {} | {} | {} | {} (cache: {}/{}, msgs: {})",
        rank,
        format_datetime_short(session.started_at),
        source_label(&session.source),
        model,
        project_label(&session.project_path),
        duration,
        format_tokens(session.total_tokens),
        format_tokens(session.cache_creation_tokens),
        format_tokens(session.cache_read_tokens),
        session.message_count
    );
}

fn source_label(source: &str) -> &str {
    match source {
        "codex" => "Codex",
        "claude" => "Claude",
        other => other,
    }
}

/// Last path segment of the project directory, or a placeholder.
fn project_label(path: &str) -> &str {
    if path.is_empty() {
        return "(no project)";
    }
    path.rsplit('/').next().unwrap_or(path)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn token_breakdown(input: i64, output: i64, cache_creation: i64, cache_read: i64) -> String {
    format!(
        "{}/{}/{}/{}",
        format_tokens(input),
        format_tokens(output),
        format_tokens(cache_creation),
        format_tokens(cache_read)
    )
}
