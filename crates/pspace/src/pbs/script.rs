use std::path::Path;

/// Everything needed to build the PBS script of one parameter set.
#[derive(Debug, Clone)]
pub struct JobScript<'a> {
    /// Job name, the datafile of the parameter set.
    pub name: &'a str,
    pub workdir: &'a Path,
    /// Mail events (`a`, `b`, `e` or combinations).
    pub mail_events: Option<&'a str>,
    pub email: Option<&'a str>,
    pub queue: Option<&'a str>,
    pub command: &'a str,
}

/// Prefix of the stdout/stderr files of a job, e.g. `eo-j1-l10` for `j1/l10.h5`.
pub fn output_stem(name: &str) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, extension)) if !extension.contains('/') => stem,
        _ => name,
    };
    format!("eo-{}", stem.replace('/', "-"))
}

pub fn build_pbs_job_script(job: &JobScript) -> String {
    let mut script = String::from("#!/bin/sh\n");
    if let Some(events) = job.mail_events.filter(|events| !events.is_empty()) {
        script.push_str(&format!("#PBS -m {events}\n"));
    }
    if let Some(email) = job.email.filter(|email| !email.is_empty()) {
        script.push_str(&format!("#PBS -M {email}\n"));
    }

    let stem = output_stem(job.name);
    script.push_str(&format!(
        r##"#PBS -N {name}
#PBS -d {workdir}
#PBS -o {stem}.out
#PBS -e {stem}.err
#PBS -l nodes=1:ppn=1
"##,
        name = job.name,
        workdir = job.workdir.display(),
    ));

    if let Some(queue) = job.queue.filter(|queue| !queue.is_empty()) {
        script.push_str(&format!("#PBS -q {queue}\n"));
    }
    script.push('\n');
    script.push_str(job.command);
    script.push('\n');
    script
}
