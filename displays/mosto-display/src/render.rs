//! Screen layouts
//!
//! [`render`] updates the [`Screen`] buffer for one display command.
//! A command with `clear` set wipes the body first; the banner row survives
//! so the state name stays visible across redraws.

use core::fmt::{self, Write};

use heapless::String;
use mosto_core::messages::{DisplayCommand, DisplayKind, ProcessStatus};
use mosto_core::recipe::{self, RECIPES};

use crate::backend::{DisplayBackend, DisplayError};
use crate::screen::{Screen, BANNER_ROW, ECHO_ROW};

/// First row of the recipe detail rest list
const DETAIL_FIRST_STEP_ROW: usize = 3;
/// Rows available for rests on the detail screen
const DETAIL_STEP_ROWS: usize = 3;

/// Apply a display command to the screen buffer
pub fn render(screen: &mut Screen, cmd: &DisplayCommand) {
    if cmd.clear {
        screen.clear_body();
    }

    match &cmd.kind {
        DisplayKind::StateBanner(name) => screen.set_line(BANNER_ROW, name),
        DisplayKind::KeypadEcho(text) => screen.set_line(ECHO_ROW, text),
        DisplayKind::Clear => screen.clear(),
        DisplayKind::Startup => {
            screen.set_line(1, "Mosto brew control");
            screen.set_line(3, "Starting...");
        }
        DisplayKind::IdleMenu => {
            screen.set_line(1, "Welcome!");
            screen.set_line(3, "1 - Start");
            screen.set_line(4, "2 - Exit");
            screen.set_line(5, "* - Dump log");
        }
        DisplayKind::RecipeList => {
            screen.set_line(1, "Recipes:");
            for (i, r) in RECIPES.iter().enumerate() {
                line_fmt(screen, 2 + i, format_args!("{}- {}", i + 1, r.name));
            }
        }
        DisplayKind::RecipeDetail { recipe_id } => recipe_detail(screen, *recipe_id),
        DisplayKind::ProcessStatus(status) => process_status(screen, status),
        DisplayKind::Finished => {
            screen.set_line(1, "Process complete!");
            screen.set_line(2, "Recipe finished.");
            screen.set_line(4, "Back to main menu...");
        }
    }
}

/// Push the whole buffer to the panel
pub async fn present<B: DisplayBackend>(
    screen: &mut Screen,
    backend: &mut B,
) -> Result<(), DisplayError> {
    backend.clear()?;
    for (row, line) in screen.lines().enumerate() {
        if !line.is_empty() {
            backend.draw_text(row as u8, 0, line)?;
        }
    }
    backend.flush().await?;
    screen.mark_clean();
    Ok(())
}

fn recipe_detail(screen: &mut Screen, recipe_id: u8) {
    let Some(r) = recipe::recipe(recipe_id.saturating_sub(1) as usize) else {
        screen.set_line(1, "ERROR: bad recipe");
        return;
    };

    screen.set_line(1, r.name);
    line_fmt(screen, 2, format_args!("Steps: {}", r.num_steps()));

    let truncated = r.num_steps() > DETAIL_STEP_ROWS;
    for (i, step) in r.steps.iter().enumerate() {
        let row = DETAIL_FIRST_STEP_ROW + i;
        if truncated && i == DETAIL_STEP_ROWS - 1 {
            screen.set_line(row, "...more steps");
            break;
        }
        line_fmt(
            screen,
            row,
            format_args!("* {} {} C {} min", step.name, step.target_c, step.duration_min),
        );
    }

    screen.set_line(6, "1 - Start recipe");
    screen.set_line(7, "2 - Back to recipes");
}

fn process_status(screen: &mut Screen, status: &ProcessStatus) {
    screen.set_line(1, status.recipe_name);
    line_fmt(
        screen,
        2,
        format_args!(
            "Step {}/{}: {}",
            status.step_number, status.total_steps, status.step_name
        ),
    );
    line_fmt(
        screen,
        3,
        format_args!("Temp: {} C / {} C", status.current_c, status.target_c),
    );
    if status.ramping {
        screen.set_line(4, "Awaiting setpoint");
    } else {
        line_fmt(
            screen,
            4,
            format_args!("Time: {} m {:02} s", status.minutes, status.seconds),
        );
    }
    if status.sensor_fault {
        screen.set_line(5, "SENSOR FAULT");
    }
    screen.set_line(6, "A - Abort");
}

/// Format into a row, truncating at the right edge
fn line_fmt(screen: &mut Screen, row: usize, args: fmt::Arguments<'_>) {
    let mut buf: String<48> = String::new();
    let _ = buf.write_fmt(args);
    screen.set_line(row, &buf);
}
