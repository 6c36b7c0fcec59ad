// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typedesc-inspect - browse the builtin type catalogue
//!
//! Lists registered descriptors, prints their layout and runs the comparer
//! family on command-line operands.

use clap::{Parser, Subcommand};
use colored::*;
use typedesc::ordering::{compare_mem, compare_scalar, compare_strn, compare_strz, Context};
use typedesc::types::{builtin_registry, TypeKind, TypeRef};
use typedesc::Ordering;

/// Type descriptor inspector
#[derive(Parser, Debug)]
#[command(name = "typedesc-inspect")]
#[command(version)]
#[command(about = "Inspect runtime type descriptors")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every builtin type
    List,
    /// Show one type: kind, size, default, fields
    Show {
        /// Type name (e.g. i32, bytes, template_cons)
        name: String,
    },
    /// Compare two operands with a comparer
    Cmp {
        /// Comparer: strz, strn:<n>, mem:<n>, i64, u64, f64
        comparer: ComparerArg,
        check: String,
        baseline: String,
    },
}

#[derive(Clone, Copy, Debug)]
enum ComparerArg {
    Strz,
    Strn(usize),
    Mem(usize),
    I64,
    U64,
    F64,
}

impl std::str::FromStr for ComparerArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bounded = |rest: &str| {
            rest.parse::<usize>()
                .map_err(|e| format!("Bad length '{}': {}", rest, e))
        };
        match s.split_once(':') {
            Some(("strn", n)) => Ok(ComparerArg::Strn(bounded(n)?)),
            Some(("mem", n)) => Ok(ComparerArg::Mem(bounded(n)?)),
            _ => match s {
                "strz" => Ok(ComparerArg::Strz),
                "i64" => Ok(ComparerArg::I64),
                "u64" => Ok(ComparerArg::U64),
                "f64" => Ok(ComparerArg::F64),
                _ => Err(format!("Unknown comparer: {}", s)),
            },
        }
    }
}

fn main() {
    // RUST_LOG=debug shows registry and constructor traces
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    match &args.command {
        Command::List => {
            list();
            Ok(())
        }
        Command::Show { name } => {
            let ty = builtin_registry()
                .get(name)
                .ok_or_else(|| format!("No such type: {}", name))?;
            show(&ty);
            Ok(())
        }
        Command::Cmp {
            comparer,
            check,
            baseline,
        } => {
            let result = compare(*comparer, check, baseline)?;
            println!("{}", describe(result));
            Ok(())
        }
    }
}

fn list() {
    let registry = builtin_registry();
    println!("{} builtin types", registry.len().to_string().bold());
    for name in registry.names() {
        if let Some(ty) = registry.get(&name) {
            println!(
                "  {:<14} {:>4} B  {}",
                name.cyan(),
                ty.size(None),
                ty.info().unwrap_or("")
            );
        }
    }
}

fn show(ty: &TypeRef) {
    println!("{} {}", "type".bold(), ty.name().cyan());
    if let Some(info) = ty.info() {
        println!("  info     {}", info);
    }
    println!("  parity   {}", ty.parity());
    println!("  kind     {}", kind_label(ty.kind()));
    println!("  size     {} B", ty.size(None));
    match ty.has_default() {
        Some(value) => println!("  default  {:?}", value),
        None => println!("  default  {}", "none".dimmed()),
    }

    if let Some(desc) = ty.is_struct() {
        println!("  tracked  {}", desc.is_tracked());
        if let Some(base) = desc.base() {
            println!("  base     {}", base.name());
        }
        for field in desc.fields() {
            let ty_name = field.ty.as_ref().map_or("-", |t| t.name());
            println!("    #{:<2} {:<12} {:<10} {} B", field.index, field.name, ty_name, field.size);
        }
    }
}

fn kind_label(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Scalar(s) => format!("scalar ({})", s.name()),
        TypeKind::Struct(desc) => format!("struct ({} fields)", desc.len()),
        TypeKind::Bytes => "bytes".to_string(),
        TypeKind::Identity { function: true } => "function reference".to_string(),
        TypeKind::Identity { function: false } => "object reference".to_string(),
        TypeKind::Type => "type".to_string(),
        TypeKind::Opaque { size } => format!("opaque ({} B)", size),
    }
}

fn compare(which: ComparerArg, check: &str, baseline: &str) -> Result<Ordering, String> {
    let none = Context::none();
    let result = match which {
        ComparerArg::Strz => compare_strz::<str>(&none, Some(check), Some(baseline)),
        ComparerArg::Strn(n) => compare_strn::<str>(&Context::len(n), Some(check), Some(baseline)),
        ComparerArg::Mem(n) => compare_mem(
            &Context::len(n),
            Some(check.as_bytes()),
            Some(baseline.as_bytes()),
        ),
        ComparerArg::I64 => {
            let (a, b) = (parse::<i64>(check)?, parse::<i64>(baseline)?);
            compare_scalar(&none, Some(&a), Some(&b))
        }
        ComparerArg::U64 => {
            let (a, b) = (parse::<u64>(check)?, parse::<u64>(baseline)?);
            compare_scalar(&none, Some(&a), Some(&b))
        }
        ComparerArg::F64 => {
            let (a, b) = (parse::<f64>(check)?, parse::<f64>(baseline)?);
            compare_scalar(&none, Some(&a), Some(&b))
        }
    };
    log::debug!("[inspect] {:?} {:?} {:?} -> {:?}", which, check, baseline, result);
    Ok(result)
}

fn parse<T: std::str::FromStr>(s: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(|e| format!("Bad operand '{}': {}", s, e))
}

fn describe(result: Ordering) -> ColoredString {
    match result {
        Ordering::LESS => "less".green(),
        Ordering::EQUAL => "equal".green(),
        Ordering::GREATER => "greater".green(),
        Ordering::LOSSY => "lossy (only less-than available)".yellow(),
        Ordering::MISMATCH => "type mismatch".red(),
        other if other.is_error() => "invalid".red(),
        other => format!("raw {}", other.raw()).normal(),
    }
}
