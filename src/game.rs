use std::io::{BufRead, Write};

use anyhow::Result;
use log::{debug, info};

use crate::scenario::{ScenarioState, StateCatalog};
use crate::session::{breach_meter, Debrief, Session, SessionController};

// ---------------------------------------------------------------------------
// Round outcome
// ---------------------------------------------------------------------------

/// Outcome of a single play-through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Player reached a terminal state.
    Finished(Debrief),
    /// Player typed quit (or input ended) mid-round.
    Quit(Debrief),
}

impl RoundOutcome {
    pub fn debrief(&self) -> &Debrief {
        match self {
            RoundOutcome::Finished(d) | RoundOutcome::Quit(d) => d,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn show_state(out: &mut impl Write, state: &ScenarioState) -> Result<()> {
    writeln!(out, "\n== {} ==", state.title)?;
    writeln!(out, "{}", state.body)?;
    if !state.is_terminal {
        writeln!(out)?;
        for (i, choice) in state.choices.iter().enumerate() {
            writeln!(out, "  [{}] {}", i + 1, choice.label)?;
        }
    }
    Ok(())
}

fn show_game_over(out: &mut impl Write, outcome: &RoundOutcome) -> Result<()> {
    let d = outcome.debrief();
    writeln!(out, "\n========================================")?;
    writeln!(out, "               DEBRIEF")?;
    writeln!(out, "========================================")?;
    match outcome {
        RoundOutcome::Finished(_) => writeln!(out, "  Ended at: {}", d.ended_at)?,
        RoundOutcome::Quit(_) => writeln!(out, "  You walked away at: {}", d.ended_at)?,
    }
    writeln!(out, "  XP:     {}", d.total_xp)?;
    writeln!(out, "  Breach: {}%", d.breach_meter())?;
    writeln!(out, "  Steps:  {} / {}", d.steps_taken, d.max_steps)?;
    writeln!(out, "========================================\n")?;
    writeln!(out, "  [r] Restart    [q] Quit\n")?;
    Ok(())
}

/// Map a typed line to a choice id. A 1-based number picks by position
/// (choice ids always contain a letter, so a number is never an id);
/// anything else is passed through and left for the engine to judge.
fn resolve_input(state: &ScenarioState, input: &str) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| state.choices.get(i))
        .map(|c| c.id.clone())
        .unwrap_or_else(|| input.to_string())
}

/// `None` on end of input.
fn read_trimmed(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Read the player's post-game choice. Returns `true` to restart, `false` to quit.
fn prompt_restart(input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    loop {
        write!(out, "> ")?;
        out.flush()?;
        match read_trimmed(input)?.map(|s| s.to_lowercase()).as_deref() {
            Some("r") => return Ok(true),
            Some("q") | None => return Ok(false),
            _ => writeln!(out, "  Press [r] to restart or [q] to quit.")?,
        }
    }
}

// ---------------------------------------------------------------------------
// Single round
// ---------------------------------------------------------------------------

fn play_round(
    ctl: &mut SessionController<'_>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<RoundOutcome> {
    loop {
        let state = ctl.current_state();
        show_state(out, state)?;

        if ctl.is_complete() {
            info!("Round over at '{}' (xp {})", state.id, ctl.total_xp());
            return Ok(RoundOutcome::Finished(ctl.debrief()));
        }

        write!(out, "\n> ")?;
        out.flush()?;
        let line = match read_trimmed(input)? {
            Some(line) => line,
            None => return Ok(RoundOutcome::Quit(ctl.debrief())),
        };

        if line.is_empty() {
            writeln!(out, "(Pick one of the options.)")?;
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Ok(RoundOutcome::Quit(ctl.debrief()));
        }

        let choice_id = resolve_input(state, &line);
        debug!("Input \"{line}\" resolved to '{choice_id}'");

        match ctl.choose(&choice_id) {
            Ok(o) => {
                writeln!(out, "\n{}", o.feedback)?;
                writeln!(
                    out,
                    "(XP {:+} -> {} | breach {:+} -> {}%)",
                    o.xp_delta,
                    o.total_xp,
                    o.breach_delta,
                    breach_meter(o.total_breach)
                )?;
            }
            // stale or mistyped input: re-render the same state
            Err(_) => writeln!(out, "That option isn't available here.")?,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point: runs rounds until the player quits
// ---------------------------------------------------------------------------

/// Play rounds from `scenario_id` until the player quits. `on_round` sees
/// the finished session after every round (for persistence).
pub fn run<F>(
    catalog: &StateCatalog,
    scenario_id: Option<&str>,
    input: &mut impl BufRead,
    out: &mut impl Write,
    mut on_round: F,
) -> Result<()>
where
    F: FnMut(&Session, &Debrief) -> Result<()>,
{
    let mut ctl = SessionController::start(catalog, scenario_id);

    loop {
        writeln!(out, "\n========================================")?;
        writeln!(out, "        BREACH SIMULATION")?;
        writeln!(out, "========================================")?;
        writeln!(out, "Type a number or option id, or 'quit'.")?;

        let outcome = play_round(&mut ctl, input, out)?;
        on_round(ctl.session(), outcome.debrief())?;
        show_game_over(out, &outcome)?;

        if !prompt_restart(input, out)? {
            writeln!(out, "Stay vigilant.")?;
            break;
        }

        info!("Player chose to restart");
        ctl.restart(scenario_id);
    }

    Ok(())
}
