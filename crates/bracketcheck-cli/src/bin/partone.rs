//! `partone`: prints `True` or `False` for each data line.

use bracketcheck_core::OutputVariant;

fn main() -> anyhow::Result<()> {
    bracketcheck_cli::main_for(OutputVariant::PartOne)
}
