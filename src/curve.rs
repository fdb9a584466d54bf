//! Time-demand curve export.
//!
//! Samples each task's time-demand function over a plotting horizon and
//! writes the samples as CSV (one `t` column, one demand column per task,
//! plus the uniprocessor service curve `w = t` for reference). The
//! default horizon is the hyperperiod: the least common multiple of all
//! task periods.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::taskset::TaskSet;

/// Number of sample points targeted per curve; the integer step size is
/// rounded so short horizons are sampled at every tick.
const TARGET_SAMPLES: u64 = 1000;

/// Greatest common divisor, Euclid's algorithm.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Least common multiple; saturates on overflow.
pub fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a / gcd(a, b)).saturating_mul(b)
}

/// The hyperperiod of the set: LCM of all task periods. `None` for an
/// empty set, which has no natural horizon.
pub fn hyperperiod(set: &TaskSet) -> Option<u64> {
    set.tasks()
        .iter()
        .map(|t| t.period)
        .reduce(lcm)
}

/// Write curve samples for every task in `set` to `out`.
///
/// `duration` overrides the default hyperperiod horizon.
pub fn write_curves<W: Write>(set: &TaskSet, duration: Option<u64>, out: &mut W) -> io::Result<()> {
    let horizon = match duration.or_else(|| hyperperiod(set)) {
        Some(h) if h > 0 => h,
        _ => return Ok(()),
    };

    write!(out, "t")?;
    for (i, task) in set.tasks().iter().enumerate() {
        write!(
            out,
            ",w{}:{}",
            i + 1,
            task.name.as_deref().unwrap_or("<unnamed>")
        )?;
    }
    writeln!(out, ",service")?;

    let demands: Vec<_> = (0..set.tasks().len())
        .map(|idx| set.time_demand_at(idx))
        .collect();
    let step = (horizon / TARGET_SAMPLES).max(1);
    let mut t = 0;
    loop {
        write!(out, "{t}")?;
        for demand in &demands {
            write!(out, ",{}", demand.eval(t))?;
        }
        writeln!(out, ",{t}")?;
        if t >= horizon {
            break;
        }
        // Always land exactly on the horizon for the last sample.
        t = (t + step).min(horizon);
    }
    Ok(())
}

/// Export curve samples to `demandcurve-<set name>.csv` in the current
/// directory and return the path written.
pub fn save_curves(set: &TaskSet, duration: Option<u64>) -> io::Result<PathBuf> {
    let path = PathBuf::from(format!("demandcurve-{}.csv", set.name()));
    let mut out = BufWriter::new(File::create(&path)?);
    write_curves(set, duration, &mut out)?;
    out.flush()?;
    Ok(path)
}
