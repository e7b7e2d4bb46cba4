use crate::cli::BlendOverrides;
use crate::infra::apply_overrides;
use clap::Args;
use dispatch_scoring::config::{AppConfig, ScoringConfig};
use dispatch_scoring::error::AppError;
use dispatch_scoring::scoring::{LetterGrade, RuleEngine};
use dispatch_scoring::workflows::history::{grade_history, GradeSummary, HistoryImporter};
use dispatch_scoring::workflows::prediction::{
    parse_requests, write_outcomes, BlendMode, DispatchPredictor, PredictionHighlight,
    PredictionSummary,
};
use dispatch_scoring::workflows::ranking::{
    parse_dispatches, parse_technicians, write_rankings, DispatchRanking, RankingSummary,
    TechnicianRanker,
};
use std::fs::File;
use std::path::PathBuf;

/// How many dispatches the ranking report prints in detail.
const RANKING_DETAIL_LIMIT: usize = 10;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// CSV of dispatches with model_probability and estimated_duration columns
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Write per-dispatch outcomes to this CSV
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) blend: BlendOverrides,
}

/// Ranking scores candidates with the rule estimate, so it takes no blend flags.
#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// CSV of open dispatches with customer coordinates
    #[arg(long)]
    pub(crate) dispatches: PathBuf,
    /// CSV of technicians with their location and capacity
    #[arg(long)]
    pub(crate) technicians: PathBuf,
    /// Write the kept candidates to this CSV
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Technicians kept per dispatch
    #[arg(long)]
    pub(crate) top_n: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct GradeArgs {
    /// CSV export of completed dispatches
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Print every graded dispatch, not just the summary
    #[arg(long)]
    pub(crate) list: bool,
}

fn scoring_config(blend: &BlendOverrides, top_n: Option<usize>) -> Result<ScoringConfig, AppError> {
    let mut config = AppConfig::load()?.scoring;
    apply_overrides(&mut config, blend, top_n)?;
    Ok(config)
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = scoring_config(&args.blend, None)?;
    let requests = parse_requests(File::open(&args.input)?)?;

    let predictor = DispatchPredictor::from_config(&config);
    let outcomes = predictor.predict_batch(&requests)?;
    let summary = PredictionSummary::from_outcomes(&outcomes);

    if let Some(path) = &args.output {
        write_outcomes(File::create(path)?, &outcomes)?;
    }

    render_prediction_summary(&summary, &config);
    if let Some(path) = &args.output {
        println!("\nDetailed predictions saved to {}", path.display());
    }
    Ok(())
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let config = scoring_config(&BlendOverrides::default(), args.top_n)?;
    rank_files(&args, &config)
}

/// Refuses a model-only configuration rather than ranking by rules alone.
fn rank_files(args: &RankArgs, config: &ScoringConfig) -> Result<(), AppError> {
    TechnicianRanker::require_rule_estimates(config.blend_mode)?;
    let ranker = TechnicianRanker::from_config(config)?;

    let dispatches = parse_dispatches(File::open(&args.dispatches)?)?;
    let technicians = parse_technicians(File::open(&args.technicians)?)?;

    if dispatches.is_empty() {
        println!("No dispatches found");
        return Ok(());
    }

    let rankings = ranker.rank_all(&dispatches, &technicians, &RuleEngine::standard())?;

    if let Some(path) = &args.output {
        write_rankings(File::create(path)?, &rankings)?;
    }

    render_rankings(&rankings, technicians.len(), ranker.top_n());
    Ok(())
}

pub(crate) fn run_grade(args: GradeArgs) -> Result<(), AppError> {
    let import = HistoryImporter::from_path(&args.input)?;
    let graded = grade_history(&import.dispatches);
    let summary = GradeSummary::from_graded(&graded);

    println!("Historical dispatch grades");
    println!(
        "Graded {} dispatches ({} skipped for missing data)",
        summary.count, import.skipped
    );

    if args.list {
        println!("\nDispatches");
        for dispatch in &graded {
            println!(
                "- {}: {} ({}) overrun {:+.0} min",
                dispatch.dispatch_id,
                dispatch.breakdown.grade,
                dispatch.letter.band(),
                dispatch.overrun_minutes
            );
        }
    }

    render_grade_summary(&summary);
    Ok(())
}

fn render_prediction_summary(summary: &PredictionSummary, config: &ScoringConfig) {
    println!("Dispatch predictions");
    match config.blend_mode {
        BlendMode::Hybrid => println!(
            "Blend: hybrid (rule weight {:.2}, model weight {:.2})",
            config.rule_weight.rule_share(),
            config.rule_weight.model_share()
        ),
        BlendMode::ModelOnly => println!("Blend: model only"),
    }

    println!("\nDispatches scored: {}", summary.total);
    println!(
        "Predicted successes: {} ({:.1}%)",
        summary.predicted_successes,
        summary.success_rate() * 100.0
    );
    println!("Predicted failures: {}", summary.predicted_failures);
    println!(
        "Average success probability: {:.1}%",
        summary.mean_success_probability * 100.0
    );
    println!(
        "Average expected duration: {:.0} min",
        summary.mean_expected_duration_minutes
    );
    println!(
        "Average estimated duration: {:.0} min",
        summary.mean_estimated_duration_minutes
    );
    println!(
        "Average difference: {:+.0} min",
        summary.mean_duration_difference_minutes
    );

    println!("\nRecommendations");
    for (tier, count) in &summary.recommendations {
        println!("- {}: {}", tier, count);
    }

    println!("\nConfidence");
    for (level, count) in &summary.confidence {
        println!("- {}: {}", level, count);
    }

    if !summary.riskiest.is_empty() {
        println!("\nHighest risk dispatches");
        for highlight in &summary.riskiest {
            render_highlight(highlight);
        }
    }

    if !summary.longest_overruns.is_empty() {
        println!("\nLongest estimated overruns");
        for highlight in &summary.longest_overruns {
            render_highlight(highlight);
        }
    }
}

fn render_highlight(highlight: &PredictionHighlight) {
    println!(
        "- {}: {:.1}% success, {:+.0} min, {}",
        highlight.dispatch_id.as_deref().unwrap_or("(unnamed)"),
        highlight.success_probability * 100.0,
        highlight.duration_difference_minutes,
        highlight.recommendation
    );
}

fn render_rankings(rankings: &[DispatchRanking], technician_count: usize, top_n: usize) {
    let summary = RankingSummary::from_rankings(rankings);

    println!("Technician suggestions");
    println!(
        "Evaluated {} assignments ({} dispatches x {} technicians)",
        rankings.len() * technician_count,
        rankings.len(),
        technician_count
    );

    println!("\nBest match averages");
    println!(
        "Success probability: {:.1}%",
        summary.mean_success_probability * 100.0
    );
    println!("Distance: {:.1} km", summary.mean_distance_km);
    println!("Skill match rate: {:.1}%", summary.skill_match_rate * 100.0);

    println!("\nTop {} technicians per dispatch", top_n);
    for ranking in rankings.iter().take(RANKING_DETAIL_LIMIT) {
        println!(
            "\nDispatch {} (requires {})",
            ranking.dispatch_id, ranking.required_skill
        );
        for candidate in &ranking.candidates {
            println!(
                "  {}. {:<20} success {:>5.1}% | {:>6.1} km | {:<15} | match {} | score {:.1}",
                candidate.rank,
                candidate
                    .technician_name
                    .as_deref()
                    .unwrap_or(&candidate.technician_id),
                candidate.success_probability * 100.0,
                candidate.distance_km,
                candidate.technician_skill,
                if candidate.skill_match { "yes" } else { "no" },
                candidate.score
            );
        }
    }
}

fn render_grade_summary(summary: &GradeSummary) {
    println!("\nGrade statistics");
    println!("Average: {:.2}/100", summary.mean);
    println!("Median:  {:.2}/100", summary.median);
    println!("Min:     {:.2}/100", summary.min);
    println!("Max:     {:.2}/100", summary.max);
    match summary.std_dev {
        Some(spread) => println!("Std dev: {:.2}", spread),
        None => println!("Std dev: n/a"),
    }

    println!("\nGrade distribution");
    for letter in LetterGrade::ALL {
        println!(
            "{:?} ({}): {} ({:.1}%)",
            letter,
            letter.band(),
            summary.letters.get(&letter).copied().unwrap_or(0),
            summary.share(letter) * 100.0
        );
    }

    println!("\nAverage component scores");
    println!("Distance:       {:.2}/30", summary.mean_distance_score);
    println!("Duration:       {:.2}/36", summary.mean_duration_score);
    println!("Productive:     {:.2}/25", summary.mean_productive_score);
    println!("First time fix: {:.2}/15", summary.mean_first_time_fix_score);
}
