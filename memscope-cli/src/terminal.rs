//! Terminal rendition of the panel view.

use std::io::{BufRead, Write};

use memscope_core::{ListNotice, MemoryRecord, Mode, NodeDetail, PanelView, SearchResult};

/// How `confirm` is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// Ask on stdin.
    Prompt,
    /// Answer without asking.
    Assume(bool),
}

pub struct TerminalView {
    pub confirm: ConfirmPolicy,
}

impl TerminalView {
    pub fn new(confirm: ConfirmPolicy) -> Self {
        Self { confirm }
    }
}

/// One memory card: content line, then score/relevance/created line.
pub fn format_memory(memory: &MemoryRecord, relevance: Option<f64>) -> String {
    let mut meta = format!("Score: {:.2}", memory.score);
    if let Some(relevance) = relevance {
        meta.push_str(&format!(" | Relevance: {relevance:.2}"));
    }
    if !memory.created.is_empty() {
        meta.push_str(&format!(" | {}", memory.created));
    }
    format!("[{}] {}\n    {}", memory.id, memory.content, meta)
}

pub fn format_detail(detail: &NodeDetail) -> String {
    format!("Memory: {}\nScore: {}", detail.title, detail.score)
}

impl PanelView for TerminalView {
    fn show_memories(&mut self, memories: &[MemoryRecord]) {
        for memory in memories {
            println!("{}\n", format_memory(memory, None));
        }
    }

    fn show_search_results(&mut self, results: &[SearchResult]) {
        for result in results {
            println!("{}\n", format_memory(&result.memory, result.relevance_score));
        }
    }

    fn show_notice(&mut self, notice: ListNotice) {
        if notice.is_error() {
            eprintln!("{notice}");
        } else {
            println!("{notice}");
        }
    }

    fn alert(&mut self, message: &str) {
        println!("! {message}");
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        match self.confirm {
            ConfirmPolicy::Assume(answer) => answer,
            ConfirmPolicy::Prompt => {
                print!("{prompt} [y/N] ");
                let _ = std::io::stdout().flush();
                let mut line = String::new();
                match std::io::stdin().lock().read_line(&mut line) {
                    Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
                    Err(_) => false,
                }
            }
        }
    }

    fn show_mode(&mut self, mode: Mode) {
        match mode {
            Mode::List => println!("-- list mode --"),
            Mode::Graph => println!("-- graph mode --"),
        }
    }

    fn show_threshold(&mut self, threshold: f64) {
        println!("Threshold: {threshold:.2}");
    }

    fn show_detail(&mut self, detail: &NodeDetail) {
        println!("{}", format_detail(detail));
    }
}
