//! Safety mode listing

use crate::console::CliConsole;
use safety_replay_core::ReplayConfig;
use safety_replay_core::error::ReplayResult;
use safety_replay_core::safety::hooks_for;

/// Print the effective mode table, including configured overrides
pub async fn execute(config: &ReplayConfig) -> ReplayResult<()> {
    let console = CliConsole::new(true);
    let table = config.mode_table();

    console.print_header("Safety Modes");
    console.print_table_header(&["NAME", "CODE", "REPLAYABLE"]);
    for (name, code) in table.entries() {
        let code_text = format!("{} (0x{:x})", code, code);
        let replayable = if hooks_for(code).is_some() { "yes" } else { "no" };
        console.print_table_row(&[name, &code_text, replayable]);
    }
    println!();
    console.info(&format!("{} modes", table.len()));
    Ok(())
}
