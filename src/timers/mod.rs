//! Nested named timers.
//!
//! Sections are opened with `timeit!` and may nest.  Totals of the
//! top level and nested sections are looked up by path and reported as
//! the time information items of a solve.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

cfg_if::cfg_if! {
    if #[cfg(target_family = "wasm")] {
        pub(crate) use web_time::Instant;
    } else {
        pub(crate) use std::time::Instant;
    }
}

#[derive(Debug, Default, Clone)]
struct Section {
    start: Option<Instant>,
    elapsed: Duration,
    children: HashMap<&'static str, Section>,
}

impl Section {
    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(t) = self.start.take() {
            self.elapsed += t.elapsed();
        }
    }

    // elapsed time including any running interval
    fn total(&self) -> Duration {
        self.elapsed + self.start.map_or(Duration::ZERO, |t| t.elapsed())
    }

    fn suspend(&mut self) {
        if let Some(t) = self.start {
            self.elapsed += t.elapsed();
            self.start = Some(Instant::now());
            for c in self.children.values_mut() {
                c.suspend();
            }
        }
    }

    fn resume(&mut self) {
        if self.start.is_some() {
            self.start = Some(Instant::now());
            for c in self.children.values_mut() {
                c.resume();
            }
        }
    }

    fn print(&self, out: &mut dyn Write, key: &str, depth: usize) -> std::io::Result<()> {
        writeln!(out, "{:indent$}{} : {:?}", "", key, self.total(), indent = 4 * depth)?;
        let mut keys: Vec<_> = self.children.keys().collect();
        keys.sort();
        for k in keys {
            self.children[k].print(out, k, depth + 1)?;
        }
        Ok(())
    }
}

/// Collection of nested timers with a call stack of active sections
#[derive(Default, Debug, Clone)]
pub struct Timers {
    stack: Vec<&'static str>,
    root: HashMap<&'static str, Section>,
    suspended: Option<Instant>,
}

impl Timers {
    fn active_children(&mut self) -> &mut HashMap<&'static str, Section> {
        let mut map = &mut self.root;
        for key in &self.stack {
            map = &mut map.entry(*key).or_default().children;
        }
        map
    }

    /// Start `key` as a child of the currently running section
    pub fn start_as_current(&mut self, key: &'static str) {
        self.active_children().entry(key).or_default().start();
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(key) = self.stack.pop() {
            if let Some(s) = self.active_children().get_mut(key) {
                s.stop();
            }
        }
    }

    /// Freeze all running sections. Used by `notimeit!`
    pub fn suspend(&mut self) {
        for s in self.root.values_mut() {
            s.suspend();
        }
        self.suspended = Some(Instant::now());
    }

    pub fn resume(&mut self) {
        if self.suspended.take().is_some() {
            for s in self.root.values_mut() {
                s.resume();
            }
        }
    }

    /// Total time of the section at `path`, zero if it never ran
    pub fn elapsed(&self, path: &[&str]) -> Duration {
        let mut map = &self.root;
        let mut found = None;
        for key in path {
            match map.get(key) {
                Some(s) => {
                    found = Some(s);
                    map = &s.children;
                }
                None => return Duration::ZERO,
            }
        }
        found.map_or(Duration::ZERO, |s| s.total())
    }

    /// Seconds spent in the section at `path`
    pub fn seconds(&self, path: &[&str]) -> f64 {
        self.elapsed(path).as_secs_f64()
    }

    pub fn total_time(&self) -> Duration {
        self.root
            .values()
            .fold(Duration::ZERO, |acc, s| acc + s.total())
    }

    pub fn print(&self, out: &mut dyn Write) -> std::io::Result<()> {
        let mut keys: Vec<_> = self.root.keys().collect();
        keys.sort();
        for k in keys {
            self.root[k].print(out, k, 0)?;
        }
        Ok(())
    }
}

macro_rules! timeit {
    ($timer:expr => $key:literal; $($tt:tt)+) => {
        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

macro_rules! notimeit {
    ($timer:expr; $($tt:tt)+) => {
        $timer.suspend();
        $(
            $tt
        )+
        $timer.resume();
    }
}
#[allow(unused_imports)]
pub(crate) use notimeit;

#[test]
fn test_nested_sections() {
    let mut timers = Timers::default();
    timeit! {timers => "solve";
        timeit! {timers => "factor";
            std::thread::sleep(Duration::from_millis(2));
        }
    }
    assert!(timers.elapsed(&["solve"]) >= timers.elapsed(&["solve", "factor"]));
    assert!(timers.elapsed(&["solve", "factor"]) >= Duration::from_millis(2));
    assert_eq!(timers.elapsed(&["presolve"]), Duration::ZERO);

    let mut buf = Vec::new();
    timers.print(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("solve"));
    assert!(text.contains("    factor"));
}
