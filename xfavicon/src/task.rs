use console::style;
use favicon::Outcome;
use std::io::Write;
use std::time::Instant;

/// Prints one status line per generated target.
pub struct TaskRunner {
    num_tasks: usize,
    current_task: usize,
    now: Instant,
    verbose: bool,
}

impl TaskRunner {
    pub fn new(num_tasks: usize, verbose: bool) -> Self {
        Self {
            num_tasks,
            current_task: 0,
            now: Instant::now(),
            verbose,
        }
    }

    fn task_id(&self) -> String {
        style(format!("[{}/{}]", self.current_task + 1, self.num_tasks)).to_string()
    }

    pub fn finish_task(&mut self, w: &mut impl Write, outcome: &Outcome) -> std::io::Result<()> {
        let line = if outcome.is_created() {
            outcome.to_string()
        } else {
            format!("{} {}", style("[ERROR]").red(), outcome)
        };
        if self.verbose {
            writeln!(
                w,
                "{} {} [{}ms]",
                self.task_id(),
                line,
                self.now.elapsed().as_millis()
            )?;
        } else {
            writeln!(w, "{} {}", self.task_id(), line)?;
        }
        self.current_task += 1;
        self.now = Instant::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn numbers_each_outcome() -> anyhow::Result<()> {
        let mut runner = TaskRunner::new(2, false);
        let mut buf = vec![];
        runner.finish_task(
            &mut buf,
            &Outcome::Created {
                name: "a.png".into(),
                path: PathBuf::from("out/a.png"),
            },
        )?;
        runner.finish_task(
            &mut buf,
            &Outcome::Failed {
                name: "b.txt".into(),
                error: anyhow::anyhow!("unsupported"),
            },
        )?;
        let out = String::from_utf8(buf)?;
        let out = console::strip_ansi_codes(&out);
        assert_eq!(
            out,
            "[1/2] Created: out/a.png\n[2/2] [ERROR] Error creating b.txt: unsupported\n"
        );
        Ok(())
    }

    #[test]
    fn plain_prefix_without_colors() {
        console::set_colors_enabled(false);
        let runner = TaskRunner::new(6, false);
        assert_eq!(runner.task_id(), "[1/6]");
    }
}
