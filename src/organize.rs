//! The sorting run.
//!
//! Phases run strictly one after another: walk and relocate (the only
//! concurrent phase), unpack archives, remove empty folders, and finally,
//! on request, create empty category folders.

use dialoguer::Input;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

use crate::archive::unpack_all;
use crate::categories::Category;
use crate::cleanup::{precreate, reap_empty};
use crate::config::Config;
use crate::context::{SortContext, SortStats};
use crate::error::SortError;
use crate::tui::UI;
use crate::walker::{count_files, walk};

/// How many answers the "create empty folders" prompt accepts before giving up.
pub const PROMPT_ATTEMPTS: usize = 3;

/// Parses a yes/no answer. Only `y` and `n` are accepted, in any case.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

/// Asks a yes/no question up to `attempts` times.
///
/// `ask` produces one raw answer; `on_invalid` is told how many attempts are
/// left after each unusable answer.
///
/// # Errors
///
/// [`SortError::InvalidUserInput`] once every attempt was used up, or
/// whatever error `ask` returns.
pub fn prompt_yes_no<A, W>(mut ask: A, mut on_invalid: W, attempts: usize) -> color_eyre::Result<bool>
where
    A: FnMut() -> color_eyre::Result<String>,
    W: FnMut(usize),
{
    for used in 1..=attempts {
        if let Some(answer) = parse_answer(&ask()?) {
            return Ok(answer);
        }
        on_invalid(attempts - used);
    }

    Err(SortError::InvalidUserInput { attempts }.into())
}

/// Unpacks the archives bucket on the blocking pool.
///
/// Returns the directories archives were extracted into.
pub async fn unpack_archives(ctx: Arc<SortContext>) -> color_eyre::Result<Vec<PathBuf>> {
    let archives_dir = ctx.root().join(Category::Archives.as_str());
    Ok(task::spawn_blocking(move || unpack_all(&ctx, &archives_dir)).await?)
}

/// Removes empty folders directly under the root on the blocking pool.
pub async fn remove_empty_folders(ctx: Arc<SortContext>) -> color_eyre::Result<Vec<PathBuf>> {
    let removed = task::spawn_blocking(move || {
        let root = ctx.root().to_path_buf();
        reap_empty(&ctx, &root)
    })
    .await??;
    Ok(removed)
}

/// Runs the walk, unpack and cleanup phases on an already prepared context.
///
/// Returns the first walk failure, if any, alongside the run statistics. The
/// later phases run regardless of walk failures.
pub async fn sort_tree<F>(
    ctx: Arc<SortContext>,
    max_workers: usize,
    on_file: F,
) -> color_eyre::Result<(SortStats, Option<SortError>)>
where
    F: Fn(&Path) + Send + Sync + 'static,
{
    let walk_error = walk(Arc::clone(&ctx), max_workers, on_file).await.err();
    unpack_archives(Arc::clone(&ctx)).await?;
    remove_empty_folders(Arc::clone(&ctx)).await?;

    Ok((ctx.snapshot(), walk_error))
}

pub async fn handle_sort(
    source: &Path,
    create_empty: Option<bool>,
    config: &Config,
) -> color_eyre::Result<()> {
    let ui = UI::new().with_color_theme(config.ui.color.theme.clone());

    let ctx = match SortContext::new(source, config) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            ui.print_error(&e.to_string())?;
            return Err(e.into());
        }
    };
    let root: PathBuf = ctx.root().to_path_buf();

    ui.init(&format!("Source: {}", root.display()))?;

    // Phase 1: walk and relocate
    ui.print_info("Phase 1/3: Sorting files into category folders")?;
    let spinner = ui.create_spinner("Counting files...");
    let total = count_files(&root, &config.log.file_name).await;
    spinner.finish_and_clear();

    let pb = if config.ui.progress {
        ui.create_progress_bar(total, "Sorting")
    } else {
        ProgressBar::hidden()
    };

    let max_workers = config.workers.effective_workers();
    let walk_result = walk(Arc::clone(&ctx), max_workers, {
        let pb = pb.clone();
        move |_| pb.inc(1)
    })
    .await;
    pb.finish_and_clear();

    if let Err(e) = &walk_result {
        ui.print_warning(&format!("Part of the tree could not be sorted: {}", e))?;
    }

    // Phase 2: unpack archives
    ui.print_info("Phase 2/3: Unpacking archives")?;
    let spinner = ui.create_spinner("Unpacking archives...");
    let unpacked = unpack_archives(Arc::clone(&ctx)).await?;
    spinner.finish_and_clear();
    ui.print_success(&format!("Unpacked {} archive(s)", unpacked.len()))?;

    // Phase 3: remove empty folders
    ui.print_info("Phase 3/3: Removing empty folders")?;
    let spinner = ui.create_spinner("Removing empty folders...");
    let removed = remove_empty_folders(Arc::clone(&ctx)).await?;
    spinner.finish_and_clear();
    ui.print_success(&format!("Removed {} empty folder(s)", removed.len()))?;

    let stats = ctx.snapshot();
    ui.print_summary(&stats)?;

    // Optional: empty category folders
    let theme = UI::get_colorful_theme(&config.ui.color.theme);
    let answer = match create_empty {
        Some(answer) => Ok(answer),
        None => prompt_yes_no(
            || {
                Ok(Input::<String>::with_theme(&theme)
                    .with_prompt("Do you want to create empty folders? Enter Y or N")
                    .allow_empty(true)
                    .interact_text()?)
            },
            |left| {
                let _ = ui.print_warning(&format!("Invalid input. {} attempts remaining.", left));
            },
            PROMPT_ATTEMPTS,
        ),
    };

    match answer {
        Ok(true) => {
            precreate(&ctx, &root)?;
            ui.print_success("Created empty category folders")?;
        }
        Ok(false) => {}
        Err(e) => match e.downcast_ref::<SortError>() {
            Some(SortError::InvalidUserInput { .. }) => {
                ui.print_error("Exiting due to repeated incorrect input.")?;
            }
            _ => return Err(e),
        },
    }

    if stats.failed > 0 || stats.unpack_failed > 0 {
        ui.print_warning("Some files could not be processed, see the log for details")?;
    }
    if ctx.log.failed_writes() > 0 {
        ui.print_warning(&format!(
            "{} log record(s) could not be written",
            ctx.log.failed_writes()
        ))?;
    }
    ui.print_info(&format!("Log file: {}", ctx.log.path().display()))?;
    ui.print_success(&format!("Sorting complete: {}", root.display()))?;
    ui.cleanup()?;

    Ok(())
}
