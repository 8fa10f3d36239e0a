use std::io::{stdin, stdout, Write};

use anyhow::Result;
use cache_sim::{
    cache::{Access, AssociativeCache},
    scenario::Scenario,
    stat::{AddStats, Stat, Stats},
};

use terminal_size::terminal_size;

peg::parser!(grammar command() for str {
    rule radix() -> i64
        = quiet!{"0" ['x' | 'X']} n:$(quiet!{['0'..='9'|'a'..='f'|'A'..='F']+}) {? i64::from_str_radix(n, 16).or(Err("address")) }
        / n:$(quiet!{"-"? ['0'..='9']+}) {? n.parse().or(Err("address")) }
        / expected!("address")
    rule read() = "read" / "r"
    rule write() = "write" / "w"
    rule scenario() -> Scenario
        = s:$(quiet!{['a'..='z' | '-']+}) {? s.parse().or(Err("scenario name")) }
        / expected!("scenario name")
    rule show_kind() -> ShowKind
        = "stat" "s"? { ShowKind::Stat }
        / ("cache" / "lines") { ShowKind::Cache }
        / ("config" / "geometry") { ShowKind::Config }
    pub(crate) rule parse_command() -> Command
        = _ read() __ a:radix() _ { Command::Access(Access::read(a)) }
        / _ write() __ a:radix() _ { Command::Access(Access::write(a)) }
        / _ "run" __ s:scenario() _ { Command::Run(s) }
        / _ "show" __ k:show_kind() _ { Command::Show(k) }
        / _ ("exit" / "quit") _ { Command::Exit }
        / _ { Command::Nop }
        / expected!("command")

    rule ws() = quiet!{[' ' | '\t' | '\r' | '\n']}
        / expected!("whitespace")
    rule _() = ws()*
    rule __() = ws()+
});

#[derive(Debug, PartialEq)]
pub(crate) enum Command {
    Access(Access),
    Run(Scenario),
    Show(ShowKind),
    Nop,
    Exit,
}

#[derive(Debug, PartialEq)]
pub(crate) enum ShowKind {
    Stat,
    Cache,
    Config,
}

fn get_terminal_width() -> Option<u16> {
    terminal_size().map(|(w, _)| w.0.saturating_sub(20))
}

pub fn execute_interactive(cache: &mut AssociativeCache) -> Result<()> {
    let width = get_terminal_width().unwrap_or(60) as usize;
    println!("entering interactive.");
    loop {
        print!("[t={}] > ", cache.current_time());
        stdout().flush()?;
        let mut str = String::new();
        if stdin().read_line(&mut str)? == 0 {
            break;
        }
        let parsed = match command::parse_command(&str) {
            Ok(p) => p,
            Err(e) => {
                println!("parse error: expected {}", e.expected);
                continue;
            }
        };
        match parsed {
            Command::Access(Access { address, kind }) => {
                let before = cache.stats();
                if let Err(e) = cache.access(address, kind) {
                    println!("{e}");
                    continue;
                }
                let after = cache.stats();
                let tag = cache.tag_of(address)?;
                if after.total_misses == before.total_misses {
                    println!("{kind} {address:#x}: hit (tag {tag:#x})");
                } else if after.evictions != before.evictions {
                    println!("{kind} {address:#x}: miss (tag {tag:#x}), evicted LRU line");
                } else {
                    println!("{kind} {address:#x}: miss (tag {tag:#x})");
                }
            }
            Command::Run(sc) => {
                let accesses = sc.accesses();
                println!("running {sc} ({} accesses)", accesses.len());
                if let Err(e) = cache.access_all(accesses) {
                    println!("{e}");
                }
            }
            Command::Show(ShowKind::Stat) => {
                let mut stats = Stats::default();
                cache.add_stats(&mut stats);
                println!("{}", stats.view(width));
            }
            Command::Show(ShowKind::Cache) => {
                println!("{}", cache.dump().view(width));
            }
            Command::Show(ShowKind::Config) => {
                println!(
                    "{} blocks x {} words (offset bits: {})",
                    cache.num_blocks(),
                    cache.block_size_words(),
                    cache.block_offset_bits()
                );
            }
            Command::Nop => (),
            Command::Exit => break,
        }
    }
    println!("exiting interactive.");
    Ok(())
}
