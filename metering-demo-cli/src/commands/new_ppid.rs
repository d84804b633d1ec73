//! New-ppid command - print a fresh PPID without storing it

use anyhow::Result;

use metering_demo_core::{PpidGenerator, RandomPpidGenerator};

pub async fn run(count: usize) -> Result<()> {
    let generator = RandomPpidGenerator;
    for _ in 0..count.max(1) {
        println!("{}", generator.generate());
    }
    Ok(())
}
