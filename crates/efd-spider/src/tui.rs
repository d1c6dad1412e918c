use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A bar over `len` reports; hidden unless running in tui mode.
pub(crate) fn progress_bar(len: usize, msg: &'static str, tui: bool) -> Result<ProgressBar> {
    if !tui {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len as u64).with_style(
        ProgressStyle::default_bar()
            .template(
                "{msg} {spinner:.magenta}\n\
                [{elapsed_precise:.magenta}] |{bar:40.cyan/blue}| {human_pos}/{human_len} reports \
                [Rate: {per_sec:.magenta}, ETA: {eta:.blue}]",
            )?
            .progress_chars("##-"),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// A spinner for work of unknown length, e.g. paging through results.
pub(crate) fn spinner(msg: &'static str, tui: bool) -> Result<ProgressBar> {
    if !tui {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new_spinner().with_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.magenta} {msg} [{elapsed_precise:.magenta}] {human_pos} reports")?,
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
