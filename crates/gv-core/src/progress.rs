use std::io::Write;

use crate::traits::Progress;

/// Progression silencieuse.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&mut self, _done: usize, _total: Option<usize>) {}
    fn finish(&mut self, _done: usize) {}
}

/// Progression sur une ligne réécrite (`\r`) d'un flux texte.
///
/// Format: `Progress: 42.00% (21/50)`. Without a known total, or once
/// `done` runs past it, only the count is printed.
///
/// # Example
/// ```
/// use gv_core::progress::ConsoleProgress;
/// use gv_core::traits::Progress;
/// let mut p = ConsoleProgress::new(Vec::new());
/// p.update(1, Some(4));
/// assert_eq!(String::from_utf8(p.into_inner()).unwrap(), "\rProgress: 25.00% (1/4)");
/// ```
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl ConsoleProgress<std::io::Stderr> {
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn update(&mut self, done: usize, total: Option<usize>) {
        // Write errors on a progress line are not worth aborting for.
        let _ = match total {
            Some(total) if total > 0 && done <= total => {
                let percent = done as f64 / total as f64 * 100.0;
                write!(self.out, "\rProgress: {percent:.2}% ({done}/{total})")
            }
            _ => write!(self.out, "\rProgress: {done} frames"),
        };
        let _ = self.out.flush();
    }

    fn finish(&mut self, done: usize) {
        let _ = writeln!(self.out, "\rProgress: 100.00% ({done}/{done})");
        let _ = self.out.flush();
    }
}
