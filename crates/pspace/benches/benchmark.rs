use std::hint::black_box;
use std::path::Path;

use criterion::measurement::WallTime;
use criterion::{BenchmarkGroup, BenchmarkId, Criterion, criterion_group, criterion_main};
use pspace::common::config::parse_conf_text;
use pspace::common::expr::Value;
use pspace::common::pspace::{compute_psets, filter_psets};
use pspace::common::template::Template;

fn conf_with_values(count: usize) -> String {
    format!(
        "DECLARE J, L
WORKDIR /tmp/pspace-bench
DATAFILE j%d/l%d
DATAFILE_VALUES J, L
CMD_EXEC simulate -J %g -L %g -o %s
CMD_EXEC_VALUES J, L, FILE
CMD_FILE simulate --init -J %g -L %g -o %s
CMD_FILE_VALUES J, L, FILE
CMD_ACC h5acc %s
CMD_ACC_VALUES FILE
CMD_CHECKFILE h5check %s
CMD_CHECKFILE_VALUES FILE
PSPACE:
    PARAM J 1:{count}
    PARAM L 10, 20
    ACC 1%
"
    )
}

fn bench_template(c: &mut BenchmarkGroup<WallTime>) {
    c.bench_function("parse", |bencher| {
        bencher.iter(|| Template::parse(black_box("simulate --init -J %g -L %5.2f -o %s")));
    });
    let template = Template::parse("simulate --init -J %g -L %5.2f -o %s").unwrap();
    let values = [
        Value::Float(3.0),
        Value::Float(12.5),
        Value::Str("j3/l12.h5".to_string()),
    ];
    c.bench_function("render", |bencher| {
        bencher.iter(|| template.render(black_box(&values)));
    });
}

fn bench_psets(c: &mut Criterion) {
    let path = Path::new("/tmp/pspace-bench/pspace.conf");
    let cwd = Path::new("/tmp");
    for count in [10, 100, 1_000] {
        let conf = parse_conf_text(&conf_with_values(count), path).unwrap();
        c.bench_with_input(
            BenchmarkId::new("compute psets", count),
            &conf,
            |b, conf| {
                b.iter(|| compute_psets(conf, cwd));
            },
        );

        let psets = compute_psets(&conf, cwd).unwrap();
        c.bench_with_input(
            BenchmarkId::new("filter psets", count),
            &psets,
            |b, psets| {
                b.iter(|| filter_psets(psets.clone(), "J=5:,L=10", &conf.pnames));
            },
        );
    }
}

pub fn benchmark_templates(c: &mut Criterion) {
    let mut group = c.benchmark_group("template");
    bench_template(&mut group);
}

criterion_group!(templates, benchmark_templates);
criterion_group!(psets, bench_psets);

criterion_main!(templates, psets);
