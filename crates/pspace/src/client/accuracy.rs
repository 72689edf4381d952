//! Queries of the datafile content through the configured shell commands.
use std::time::Duration;

use crate::common::compare::compare;
use crate::common::config::Config;
use crate::common::pspace::{ParameterSet, cmd_acc, cmd_check};
use crate::common::utils::process::run_shell_merged;
use crate::common::utils::retry::{RetryPolicy, retry};

/// Retries used for a single accuracy or check lookup.
pub fn lookup_policy() -> RetryPolicy {
    RetryPolicy::new(Duration::from_secs(2), Some(2))
}

/// Interprets the output of `CMD_ACC`. Empty or non-numeric output means
/// that no accuracy is known yet.
pub fn parse_acc_output(output: &str) -> Option<f64> {
    let output = output.trim();
    if output.is_empty() {
        return None;
    }
    output.parse().ok()
}

/// Current accuracy of the datafile of `pset`, obtained by running `CMD_ACC`
/// inside `WORKDIR`.
pub async fn get_acc(
    conf: &Config,
    pset: &ParameterSet,
    policy: RetryPolicy,
) -> anyhow::Result<Option<f64>> {
    let command = cmd_acc(conf, pset)?;
    let output = retry(policy, || run_shell_merged(&command, &conf.workdir)).await?;
    Ok(parse_acc_output(&output))
}

/// Returns `true` if `CMD_CHECKFILE` reports any content for the datafile of `pset`.
pub async fn check_file(
    conf: &Config,
    pset: &ParameterSet,
    policy: RetryPolicy,
) -> anyhow::Result<bool> {
    let command = cmd_check(conf, pset)?;
    let output = retry(policy, || run_shell_merged(&command, &conf.workdir)).await?;
    Ok(!output.trim().is_empty())
}

/// A pset is finished when its current accuracy satisfies `CMD_ACC_OP`
/// against the target accuracy.
pub fn is_finished(conf: &Config, pset: &ParameterSet, acc: Option<f64>) -> bool {
    acc.is_some_and(|acc| compare(acc, pset.acc, conf.acc_op))
}

#[cfg(test)]
mod tests {
    use super::{check_file, get_acc, is_finished, parse_acc_output};
    use crate::common::config::parse_conf_text;
    use crate::common::pspace::compute_psets;
    use crate::common::utils::retry::RetryPolicy;
    use std::time::Duration;

    const CONF: &str = "DECLARE N
WORKDIR .
DATAFILE run%d
DATAFILE_VALUES N
CMD_EXEC true
CMD_FILE touch %s
CMD_FILE_VALUES FILE
CMD_ACC cat %s
CMD_ACC_VALUES FILE
CMD_CHECKFILE cat %s
CMD_CHECKFILE_VALUES FILE
PSPACE:
    PARAM N 1
    ACC 0.1
";

    fn no_retry() -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1), Some(0))
    }

    #[test]
    fn test_parse_acc_output() {
        assert_eq!(parse_acc_output(""), None);
        assert_eq!(parse_acc_output("  \n"), None);
        assert_eq!(parse_acc_output("0.25\n"), Some(0.25));
        assert_eq!(parse_acc_output("1e-3"), Some(1e-3));
        assert_eq!(parse_acc_output("no data"), None);
    }

    #[tokio::test]
    async fn test_get_acc_and_check_file() {
        let dir = tempfile::tempdir().unwrap();
        let conf = parse_conf_text(CONF, &dir.path().join("pspace.conf")).unwrap();
        let psets = compute_psets(&conf, dir.path()).unwrap();
        let pset = &psets["run1.h5"];

        std::fs::write(dir.path().join("run1.h5"), "").unwrap();
        assert_eq!(get_acc(&conf, pset, no_retry()).await.unwrap(), None);
        assert!(!check_file(&conf, pset, no_retry()).await.unwrap());

        std::fs::write(dir.path().join("run1.h5"), "0.05\n").unwrap();
        let acc = get_acc(&conf, pset, no_retry()).await.unwrap();
        assert_eq!(acc, Some(0.05));
        assert!(check_file(&conf, pset, no_retry()).await.unwrap());
        assert!(is_finished(&conf, pset, acc));
        assert!(!is_finished(&conf, pset, Some(0.5)));
        assert!(!is_finished(&conf, pset, None));
    }

    #[tokio::test]
    async fn test_get_acc_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let conf = parse_conf_text(CONF, &dir.path().join("pspace.conf")).unwrap();
        let psets = compute_psets(&conf, dir.path()).unwrap();
        assert!(get_acc(&conf, &psets["run1.h5"], no_retry()).await.is_err());
    }
}
