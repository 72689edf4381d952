use std::path::{Path, PathBuf};

use crate::common::compare::CompareOp;
use crate::common::error::PspaceError;
use crate::common::expr::{Expression, Scope, Value};
use crate::common::template::Template;
use crate::common::utils::fs::{absolute_path, expand_user, home_dir};
use crate::common::utils::str::split_list;
use crate::{CONF_FILENAME, Map};

/// Names that are always available in value expressions besides the declared parameters.
pub const RESERVED_NAMES: [&str; 4] = ["ACC", "FILE", "RELPATH", "ABSPATH"];

/// A printf-style template together with the expressions that fill it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTemplate {
    pub template: Template,
    pub values: Vec<Expression>,
}

impl CommandTemplate {
    pub fn evaluate(&self, scope: &dyn Scope) -> crate::Result<Vec<Value>> {
        self.values
            .iter()
            .map(|expr| expr.evaluate(scope))
            .collect()
    }

    pub fn fill(&self, scope: &dyn Scope) -> crate::Result<String> {
        self.template.render(&self.evaluate(scope)?)
    }
}

/// One `PSPACE:` block of a configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct PspaceDef {
    pub values: Map<String, Vec<f64>>,
    pub acc: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Absolute path of the configuration file.
    pub path: PathBuf,
    /// Declared parameter names in declaration order.
    pub pnames: Vec<String>,
    pub maxrun: Option<u64>,
    pub workdir: PathBuf,
    /// `WORKDIR` as written in the file.
    pub workdir_raw: Option<String>,
    pub datafile: CommandTemplate,
    pub cmd_exec: CommandTemplate,
    pub cmd_file: CommandTemplate,
    pub cmd_acc: CommandTemplate,
    pub cmd_check: CommandTemplate,
    pub acc_op: CompareOp,
    pub pspaces: Vec<PspaceDef>,
}

impl Config {
    /// Directory that contains the configuration file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("/"))
    }
}

/// Resolves command line arguments to absolute paths of configuration files.
///
/// Directories resolve to the `pspace.conf` inside them. With `force`, invalid
/// arguments are skipped instead of reported.
pub fn conf_filenames(paths: &[String], cwd: &Path, force: bool) -> crate::Result<Vec<PathBuf>> {
    let mut filenames = Vec::with_capacity(paths.len());
    for arg in paths {
        let mut path = absolute_path(&expand_user(arg), cwd);
        let error = if !path.exists() {
            Some(PspaceError::config(Path::new(arg), "no such file or directory"))
        } else {
            if path.is_dir() {
                path = path.join(CONF_FILENAME);
            }
            if path.file_name().is_none_or(|name| name != CONF_FILENAME) {
                Some(PspaceError::config(&path, "wrong filename"))
            } else if !path.is_file() {
                Some(PspaceError::config(&path, "no such file"))
            } else {
                None
            }
        };
        match error {
            Some(_) if force => log::debug!("Skipping {arg}"),
            Some(error) => return Err(error),
            None => filenames.push(path),
        }
    }
    Ok(filenames)
}

pub fn conf_syntax_error(file: &Path, line: usize) -> PspaceError {
    PspaceError::config_at(file, line, "syntax error")
}

/// Loads and validates the configuration file at `path`.
pub fn parse_conf(path: &Path) -> crate::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|error| PspaceError::config(path, error.to_string()))?;
    parse_conf_text(&text, path)
}

/// Splits a `*_VALUES` list at commas and whitespace outside of parentheses and quotes.
fn split_expressions(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;

    for (index, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if depth == 0 && (c == ',' || c.is_whitespace()) {
            if let Some(start) = start.take() {
                parts.push(&text[start..index]);
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        start.get_or_insert(index);
    }
    if let Some(start) = start {
        parts.push(&text[start..]);
    }
    parts
}

/// Values `start`, `start + step`, ... below `end` (above for a negative step).
fn arange(start: f64, end: f64, step: f64) -> Vec<f64> {
    let count = ((end - start) / step).ceil();
    if count.is_nan() || count <= 0.0 {
        return Vec::new();
    }
    (0..count as usize)
        .map(|index| start + index as f64 * step)
        .collect()
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse().ok()
}

fn parse_range(range: &str) -> Option<Vec<f64>> {
    let parts: Vec<&str> = range.split(':').collect();
    let optional = |text: &str| -> Option<Option<f64>> {
        if text.is_empty() {
            Some(None)
        } else {
            parse_number(text).map(Some)
        }
    };
    match parts.as_slice() {
        [value] => parse_number(value).map(|value| vec![value]),
        [start, end] => {
            let start = optional(start)?.unwrap_or(0.0);
            let end = parse_number(end)?;
            Some(arange(start, end, 1.0))
        }
        [start, end, step] => {
            let start = optional(start)?.unwrap_or(0.0);
            let end = parse_number(end)?;
            let step = optional(step)?.unwrap_or(1.0);
            if step == 0.0 {
                return None;
            }
            Some(arange(start, end, step))
        }
        _ => None,
    }
}

fn parse_acc(text: &str) -> Option<f64> {
    let (number, divisor) = if let Some(number) = text.strip_suffix('%') {
        (number, 100.0)
    } else if let Some(number) = text.strip_suffix("ppm") {
        (number, 1e6)
    } else if let Some(number) = text.strip_suffix("ppb") {
        (number, 1e9)
    } else {
        (text, 1.0)
    };
    parse_number(number).map(|value| value / divisor)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Default)]
struct PspaceBuilder {
    values: Map<String, Vec<f64>>,
    acc: Option<f64>,
}

#[derive(Default)]
struct ConfigBuilder {
    pnames: Vec<String>,
    maxrun: Option<u64>,
    workdir_raw: Option<String>,
    templates: Map<&'static str, Template>,
    values: Map<&'static str, Vec<Expression>>,
    acc_op: Option<CompareOp>,
    pspaces: Vec<PspaceBuilder>,
}

const TEMPLATE_KEYWORDS: [&str; 5] = ["DATAFILE", "CMD_EXEC", "CMD_FILE", "CMD_ACC", "CMD_CHECKFILE"];
const VALUES_KEYWORDS: [&str; 5] = [
    "DATAFILE_VALUES",
    "CMD_EXEC_VALUES",
    "CMD_FILE_VALUES",
    "CMD_ACC_VALUES",
    "CMD_CHECKFILE_VALUES",
];

fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    }
}

impl ConfigBuilder {
    fn parse_top_level(&mut self, path: &Path, line_nr: usize, line: &str) -> crate::Result<bool> {
        let at = |message: String| PspaceError::config_at(path, line_nr, message);
        if line == "PSPACE:" {
            self.pspaces.push(PspaceBuilder::default());
            return Ok(true);
        }

        let (keyword, rest) = split_keyword(line);
        match keyword {
            "DECLARE" => {
                for name in split_list(rest) {
                    if self.pnames.iter().any(|declared| declared == name) {
                        return Err(at(format!("parameter \"{name}\" already declared")));
                    }
                    if !is_identifier(name) {
                        return Err(at(format!("invalid parameter name \"{name}\"")));
                    }
                    if RESERVED_NAMES.contains(&name) {
                        return Err(at(format!("parameter name \"{name}\" is reserved")));
                    }
                    self.pnames.push(name.to_string());
                }
            }
            "MAXRUN" => {
                let number: i64 = rest
                    .parse()
                    .map_err(|_| conf_syntax_error(path, line_nr))?;
                if number < 1 {
                    return Err(at("MAXRUN must be positive integer".to_string()));
                }
                if self.maxrun.is_some() {
                    return Err(at("MAXRUN already specified".to_string()));
                }
                self.maxrun = Some(number as u64);
            }
            "WORKDIR" => {
                if rest.is_empty() {
                    return Err(conf_syntax_error(path, line_nr));
                }
                if self.workdir_raw.is_some() {
                    return Err(at("WORKDIR already specified".to_string()));
                }
                self.workdir_raw = Some(rest.to_string());
            }
            "CMD_ACC_OP" => {
                if self.acc_op.is_some() {
                    return Err(at("CMD_ACC_OP already specified".to_string()));
                }
                let op = rest
                    .parse()
                    .map_err(|_| at("unknown comparison operator".to_string()))?;
                self.acc_op = Some(op);
            }
            keyword if TEMPLATE_KEYWORDS.contains(&keyword) => {
                let keyword = TEMPLATE_KEYWORDS
                    .into_iter()
                    .find(|k| *k == keyword)
                    .unwrap_or_default();
                if rest.is_empty() {
                    return Err(conf_syntax_error(path, line_nr));
                }
                if self.templates.contains_key(keyword) {
                    return Err(at(format!("{keyword} already specified")));
                }
                let template = Template::parse(rest).map_err(|error| at(error.to_string()))?;
                self.templates.insert(keyword, template);
            }
            keyword if VALUES_KEYWORDS.contains(&keyword) => {
                let keyword = VALUES_KEYWORDS
                    .into_iter()
                    .find(|k| *k == keyword)
                    .unwrap_or_default();
                if rest.is_empty() {
                    return Err(conf_syntax_error(path, line_nr));
                }
                if self.values.contains_key(keyword) {
                    return Err(at(format!("{keyword} already specified")));
                }
                let exprs = split_expressions(rest)
                    .into_iter()
                    .map(|source| {
                        Expression::parse(source)
                            .map_err(|error| at(format!("invalid expression \"{source}\": {error}")))
                    })
                    .collect::<crate::Result<Vec<_>>>()?;
                self.values.insert(keyword, exprs);
            }
            _ => return Err(conf_syntax_error(path, line_nr)),
        }
        Ok(false)
    }

    fn parse_pspace_line(&mut self, path: &Path, line_nr: usize, line: &str) -> crate::Result<()> {
        let at = |message: String| PspaceError::config_at(path, line_nr, message);
        let Some(pspace) = self.pspaces.last_mut() else {
            return Err(conf_syntax_error(path, line_nr));
        };

        let (keyword, rest) = split_keyword(line);
        match keyword {
            "PARAM" => {
                let words = split_list(rest);
                let Some((name, ranges)) = words.split_first() else {
                    return Err(conf_syntax_error(path, line_nr));
                };
                if ranges.is_empty() {
                    return Err(conf_syntax_error(path, line_nr));
                }
                let mut values = Vec::new();
                for range in ranges {
                    values.extend(parse_range(range).ok_or_else(|| conf_syntax_error(path, line_nr))?);
                }
                if pspace.values.contains_key(*name) {
                    return Err(at(format!(
                        "values for parameter \"{name}\" already specified in this context"
                    )));
                }
                pspace.values.insert(name.to_string(), values);
            }
            "ACC" => {
                let acc = parse_acc(rest).ok_or_else(|| conf_syntax_error(path, line_nr))?;
                if pspace.acc.is_some() {
                    return Err(at("ACC already specified in this context".to_string()));
                }
                pspace.acc = Some(acc);
            }
            _ => return Err(conf_syntax_error(path, line_nr)),
        }
        Ok(())
    }

    fn take_template(&mut self, path: &Path, keyword: &'static str) -> crate::Result<CommandTemplate> {
        let Some(template) = self.templates.remove(keyword) else {
            return Err(PspaceError::config(path, format!("missing {keyword} specification")));
        };
        let values = self
            .values
            .remove(format!("{keyword}_VALUES").as_str())
            .unwrap_or_default();
        if values.len() != template.arity() {
            return Err(PspaceError::config(
                path,
                format!(
                    "{keyword} expects {} values, {keyword}_VALUES provides {}",
                    template.arity(),
                    values.len()
                ),
            ));
        }
        Ok(CommandTemplate { template, values })
    }

    fn finish(mut self, path: &Path) -> crate::Result<Config> {
        let mut pspaces = Vec::with_capacity(self.pspaces.len());
        for pspace in std::mem::take(&mut self.pspaces) {
            if let Some(name) = pspace
                .values
                .keys()
                .find(|name| !self.pnames.contains(*name))
            {
                return Err(PspaceError::config(path, format!("parameter \"{name}\" undeclared")));
            }
            let Some(acc) = pspace.acc else {
                return Err(PspaceError::config(path, "missing ACC in PSPACE context"));
            };
            if let Some(name) = self
                .pnames
                .iter()
                .find(|name| !pspace.values.contains_key(*name))
            {
                return Err(PspaceError::config(
                    path,
                    format!("parameter \"{name}\" missing in PSPACE context"),
                ));
            }
            pspaces.push(PspaceDef {
                values: pspace.values,
                acc,
            });
        }

        let cmd_acc = self.take_template(path, "CMD_ACC")?;
        let cmd_exec = self.take_template(path, "CMD_EXEC")?;
        let cmd_file = self.take_template(path, "CMD_FILE")?;
        let cmd_check = self.take_template(path, "CMD_CHECKFILE")?;
        let datafile = self.take_template(path, "DATAFILE")?;

        let workdir = match &self.workdir_raw {
            Some(raw) => {
                let base = path.parent().unwrap_or(Path::new("/"));
                absolute_path(&expand_user(raw), base)
            }
            None => home_dir(),
        };

        Ok(Config {
            path: path.to_path_buf(),
            pnames: self.pnames,
            maxrun: self.maxrun,
            workdir,
            workdir_raw: self.workdir_raw,
            datafile,
            cmd_exec,
            cmd_file,
            cmd_acc,
            cmd_check,
            acc_op: self.acc_op.unwrap_or_default(),
            pspaces,
        })
    }
}

/// Parses configuration `text` that was read from `path`.
pub fn parse_conf_text(text: &str, path: &Path) -> crate::Result<Config> {
    let mut builder = ConfigBuilder::default();
    let mut in_pspace = false;
    let mut indent: Option<usize> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_nr = index + 1;
        let line = raw_line.split('#').next().unwrap_or_default().trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let line_indent = line.len() - line.trim_start().len();
        if in_pspace && line_indent == 0 {
            in_pspace = false;
            indent = None;
        }

        if in_pspace {
            match indent {
                None => indent = Some(line_indent),
                Some(indent) if indent != line_indent => {
                    return Err(PspaceError::config_at(path, line_nr, "unexpected indent"));
                }
                Some(_) => {}
            }
            builder.parse_pspace_line(path, line_nr, line.trim())?;
        } else {
            in_pspace = builder.parse_top_level(path, line_nr, line.trim())?;
        }
    }
    builder.finish(path)
}

#[cfg(test)]
mod tests {
    use super::{arange, conf_filenames, parse_acc, parse_conf, parse_conf_text, parse_range, split_expressions};
    use crate::common::compare::CompareOp;
    use crate::tests::utils::{EXAMPLE_CONF, write_conf};
    use std::path::Path;

    fn parse(text: &str) -> crate::Result<super::Config> {
        parse_conf_text(text, Path::new("/sim/pspace.conf"))
    }

    fn parse_err(text: &str) -> String {
        parse(text).unwrap_err().to_string()
    }

    const TEMPLATES: &str = "DATAFILE j%d
DATAFILE_VALUES J
CMD_EXEC run %g
CMD_EXEC_VALUES J
CMD_FILE init %s
CMD_FILE_VALUES FILE
CMD_ACC acc %s
CMD_ACC_VALUES FILE
CMD_CHECKFILE check %s
CMD_CHECKFILE_VALUES FILE
";

    fn with_templates(text: &str) -> String {
        format!("{TEMPLATES}{text}")
    }

    #[test]
    fn test_parse_example() {
        let conf = parse(EXAMPLE_CONF).unwrap();
        assert_eq!(conf.pnames, vec!["J".to_string(), "L".to_string()]);
        assert_eq!(conf.maxrun, Some(20));
        assert_eq!(conf.workdir, Path::new("/sim/data"));
        assert_eq!(conf.workdir_raw.as_deref(), Some("data"));
        assert_eq!(conf.acc_op, CompareOp::LessEqual);
        assert_eq!(conf.pspaces.len(), 2);
        assert_eq!(conf.pspaces[0].values["J"], vec![1.0, 2.0, 3.0]);
        assert_eq!(conf.pspaces[0].values["L"], vec![10.0, 20.0]);
        assert_eq!(conf.pspaces[0].acc, 0.01);
        assert_eq!(conf.pspaces[1].values["J"], vec![3.0]);
        assert_eq!(conf.pspaces[1].acc, 1e-3);
        assert_eq!(conf.datafile.template.source(), "j%d/l%d");
        assert_eq!(conf.cmd_exec.values.len(), 4);
    }

    #[test]
    fn test_defaults() {
        let conf = parse(&with_templates("DECLARE J\nPSPACE:\n  PARAM J 1\n  ACC 0.1\n")).unwrap();
        assert_eq!(conf.maxrun, None);
        assert_eq!(conf.workdir_raw, None);
        assert_eq!(conf.acc_op, CompareOp::LessEqual);
    }

    #[test]
    fn test_comments_and_context() {
        let conf = parse(&with_templates(
            "# header\nDECLARE J # the only one\nPSPACE:\n    # inside\n    PARAM J 1, 2\n    ACC 1ppm\nCMD_ACC_OP >\n",
        ))
        .unwrap();
        assert_eq!(conf.pspaces[0].values["J"], vec![1.0, 2.0]);
        assert_eq!(conf.pspaces[0].acc, 1e-6);
        assert_eq!(conf.acc_op, CompareOp::Greater);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse_err("FOO bar\n"), "/sim/pspace.conf:1: syntax error");
        assert_eq!(
            parse_err("DECLARE J\nMAXRUN x\n"),
            "/sim/pspace.conf:2: syntax error"
        );
        assert_eq!(
            parse_err("DECLARE J\nPSPACE:\n  PARAM J 1:2:3:4\n"),
            "/sim/pspace.conf:3: syntax error"
        );
        assert_eq!(
            parse_err("DECLARE J\nPSPACE:\n  PARAM J 1\n  FOO 2\n"),
            "/sim/pspace.conf:4: syntax error"
        );
        assert_eq!(
            parse_err("DECLARE J\nPSPACE:\n  PARAM J 1\n   ACC 2\n"),
            "/sim/pspace.conf:4: unexpected indent"
        );
    }

    #[test]
    fn test_duplicates() {
        assert_eq!(
            parse_err("DECLARE J, J\n"),
            "/sim/pspace.conf:1: parameter \"J\" already declared"
        );
        assert_eq!(
            parse_err("MAXRUN 2\nMAXRUN 3\n"),
            "/sim/pspace.conf:2: MAXRUN already specified"
        );
        assert_eq!(
            parse_err("MAXRUN 0\n"),
            "/sim/pspace.conf:1: MAXRUN must be positive integer"
        );
        assert_eq!(
            parse_err("CMD_ACC a\nCMD_ACC b\n"),
            "/sim/pspace.conf:2: CMD_ACC already specified"
        );
        assert_eq!(
            parse_err("CMD_ACC_OP =<\n"),
            "/sim/pspace.conf:1: unknown comparison operator"
        );
        assert_eq!(
            parse_err("DECLARE J\nPSPACE:\n  PARAM J 1\n  PARAM J 2\n"),
            "/sim/pspace.conf:4: values for parameter \"J\" already specified in this context"
        );
        assert_eq!(
            parse_err("DECLARE J\nPSPACE:\n  ACC 1\n  ACC 2\n"),
            "/sim/pspace.conf:4: ACC already specified in this context"
        );
        assert_eq!(
            parse_err("DECLARE FILE\n"),
            "/sim/pspace.conf:1: parameter name \"FILE\" is reserved"
        );
    }

    #[test]
    fn test_semantic_errors() {
        assert_eq!(
            parse_err(&with_templates("DECLARE J\nPSPACE:\n  PARAM K 1\n  ACC 1\n")),
            "/sim/pspace.conf: parameter \"K\" undeclared"
        );
        assert_eq!(
            parse_err(&with_templates("DECLARE J\nPSPACE:\n  PARAM J 1\n")),
            "/sim/pspace.conf: missing ACC in PSPACE context"
        );
        assert_eq!(
            parse_err(&with_templates("DECLARE J, L\nPSPACE:\n  PARAM J 1\n  ACC 1\n")),
            "/sim/pspace.conf: parameter \"L\" missing in PSPACE context"
        );
        assert_eq!(
            parse_err("DECLARE J\n"),
            "/sim/pspace.conf: missing CMD_ACC specification"
        );
        let text = with_templates("DECLARE J\n").replace("DATAFILE_VALUES J\n", "");
        assert_eq!(
            parse_err(&text),
            "/sim/pspace.conf: DATAFILE expects 1 values, DATAFILE_VALUES provides 0"
        );
    }

    #[test]
    fn test_split_expressions() {
        assert_eq!(split_expressions("J, L,FILE"), vec!["J", "L", "FILE"]);
        assert_eq!(
            split_expressions("int(J / 2), max(J, L) 'a b'"),
            vec!["int(J / 2)", "max(J, L)", "'a b'"]
        );
    }

    #[test]
    fn test_ranges() {
        assert_eq!(parse_range("2.5"), Some(vec![2.5]));
        assert_eq!(parse_range("1:4"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(parse_range(":3"), Some(vec![0.0, 1.0, 2.0]));
        assert_eq!(parse_range("30:50:10"), Some(vec![30.0, 40.0]));
        assert_eq!(parse_range("::2"), None);
        assert_eq!(parse_range("1:5:0"), None);
        assert_eq!(parse_range("a:5"), None);
        assert_eq!(arange(5.0, 1.0, 1.0), Vec::<f64>::new());
        assert_eq!(arange(3.0, 0.0, -1.0), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_acc_suffixes() {
        assert_eq!(parse_acc("0.5"), Some(0.5));
        assert_eq!(parse_acc("5%"), Some(0.05));
        assert_eq!(parse_acc("3ppb"), Some(3e-9));
        assert_eq!(parse_acc("x"), None);
    }

    #[test]
    fn test_conf_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let conf = write_conf(&dir.path().join("a"), EXAMPLE_CONF);
        std::fs::write(dir.path().join("other.conf"), "").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();

        let names = conf_filenames(&["a".to_string()], dir.path(), false).unwrap();
        assert_eq!(names, vec![conf.clone()]);
        let names = conf_filenames(&["a/pspace.conf".to_string()], dir.path(), false).unwrap();
        assert_eq!(names, vec![conf.clone()]);

        assert_eq!(
            conf_filenames(&["missing".to_string()], dir.path(), false)
                .unwrap_err()
                .to_string(),
            "missing: no such file or directory"
        );
        assert!(
            conf_filenames(&["other.conf".to_string()], dir.path(), false)
                .unwrap_err()
                .to_string()
                .ends_with("other.conf: wrong filename")
        );
        assert!(
            conf_filenames(&["empty".to_string()], dir.path(), false)
                .unwrap_err()
                .to_string()
                .ends_with("empty/pspace.conf: no such file")
        );

        let args = ["missing", "other.conf", "empty", "a"].map(String::from);
        assert_eq!(conf_filenames(&args, dir.path(), true).unwrap(), vec![conf]);
    }

    #[test]
    fn test_parse_conf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_conf(dir.path(), EXAMPLE_CONF);
        let conf = parse_conf(&path).unwrap();
        assert_eq!(conf.path, path);
        assert_eq!(conf.workdir, dir.path().join("data"));
        assert_eq!(conf.dir(), dir.path());
    }
}
