use std::io;
use std::path::Path;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};

use crate::common::cli::{GenerateCompletionOpts, RootOptions};
use crate::common::utils::fs::expand_user;

/// Candidates for the first argument, printed by `pspace --comp-words`.
pub const COMP_WORDS: &str = "cardin create delete filenames info list submit users queues";

/// Bash completion: command names for the first argument, paths afterwards.
pub const BASH_COMPLETION: &str = r#"_pspace()
{
    local curw
    COMPREPLY=()
    curw=${COMP_WORDS[COMP_CWORD]}
    mapfile -t COMPREPLY < <(pspace complete -- "$COMP_CWORD" "$curw" 2>/dev/null)
    return 0
}
complete -F _pspace -o dirnames pspace
"#;

#[derive(Parser)]
pub struct CompleteOpts {
    /// Index of the word being completed, the command itself is 0
    pub position: usize,

    /// Beginning of the word being completed
    #[arg(default_value = "", allow_hyphen_values = true)]
    pub fragment: String,
}

/// Completion candidates for the word at `position` that starts with `fragment`.
/// Paths are resolved relative to `cwd`.
pub fn complete(position: usize, fragment: &str, cwd: &Path) -> Vec<String> {
    if position <= 1 {
        return COMP_WORDS
            .split_whitespace()
            .filter(|word| word.starts_with(fragment))
            .map(|word| word.to_string())
            .collect();
    }

    let (dir, prefix) = match fragment.rfind('/') {
        Some(index) => fragment.split_at(index + 1),
        None => ("", fragment),
    };
    let search_dir = if dir.is_empty() {
        cwd.to_path_buf()
    } else {
        cwd.join(expand_user(dir))
    };
    let Ok(entries) = std::fs::read_dir(&search_dir) else {
        return vec![];
    };

    let mut candidates: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(prefix))
        .map(|name| format!("{dir}{name}"))
        .collect();
    candidates.sort();
    candidates
}

pub fn print_completions(opts: CompleteOpts, cwd: &Path) {
    for candidate in complete(opts.position, &opts.fragment, cwd) {
        println!("{candidate}");
    }
}

pub fn generate_completion(opts: GenerateCompletionOpts) -> anyhow::Result<()> {
    match opts.shell {
        Shell::Bash => print!("{BASH_COMPLETION}"),
        generator => {
            let mut app = RootOptions::command();
            eprintln!("Generating completion file for {generator}...");
            generate(generator, &mut app, "pspace".to_string(), &mut io::stdout());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{BASH_COMPLETION, complete};

    #[test]
    fn test_complete_command_names() {
        let cwd = tempfile::tempdir().unwrap();
        assert_eq!(complete(1, "c", cwd.path()), vec!["cardin", "create"]);
        assert_eq!(complete(1, "", cwd.path()).len(), 9);
        assert!(complete(1, "x", cwd.path()).is_empty());
    }

    #[test]
    fn test_complete_paths() {
        let cwd = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(cwd.path().join("ising/data")).unwrap();
        std::fs::write(cwd.path().join("ising/pspace.conf"), "").unwrap();
        std::fs::write(cwd.path().join("ising/.hidden"), "").unwrap();
        std::fs::create_dir(cwd.path().join("heisenberg")).unwrap();
        std::fs::write(cwd.path().join(".pspace_history"), "").unwrap();
        std::fs::create_dir(cwd.path().join("run 2")).unwrap();

        assert_eq!(
            complete(2, "", cwd.path()),
            vec![".pspace_history", "heisenberg", "ising", "run 2"]
        );
        assert_eq!(complete(3, "is", cwd.path()), vec!["ising"]);
        assert_eq!(complete(2, "run", cwd.path()), vec!["run 2"]);
        assert_eq!(
            complete(2, "ising/", cwd.path()),
            vec!["ising/.hidden", "ising/data", "ising/pspace.conf"]
        );
        assert_eq!(complete(2, "ising/.", cwd.path()), vec!["ising/.hidden"]);
        assert!(complete(2, "missing/", cwd.path()).is_empty());
    }

    #[test]
    fn test_bash_registration() {
        assert!(BASH_COMPLETION.contains("mapfile -t COMPREPLY < <(pspace complete"));
        assert!(BASH_COMPLETION.ends_with("complete -F _pspace -o dirnames pspace\n"));
    }
}
