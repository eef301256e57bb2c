use criterion::{black_box, criterion_group, criterion_main, Criterion};

use xmrs::codec::{simpledmrs, simplemrs, WriteOptions};
use xmrs::Xmrs;

const KIM_SLEEPS: &str = r#"[ "Kim sleeps." TOP: h0 INDEX: e2 [ e SF: prop TENSE: pres ]
  RELS: < [ proper_q<0:3> LBL: h4 ARG0: x3 [ x PERS: 3 NUM: sg ] RSTR: h5 BODY: h6 ]
          [ named<0:3> LBL: h7 ARG0: x3 CARG: "Kim" ]
          [ "_sleep_v_1_rel"<4:11> LBL: h1 ARG0: e2 ARG1: x3 ] >
  HCONS: < h0 qeq h1 h5 qeq h7 > ]"#;

const BIG_DOG: &str = "[ TOP: h0 INDEX: e2 RELS: < \
  [ _the_q<0:3> LBL: h4 ARG0: x3 RSTR: h5 BODY: h6 ] \
  [ _big_a_1<4:7> LBL: h7 ARG0: e8 ARG1: x3 ] \
  [ _dog_n_1<8:11> LBL: h7 ARG0: x3 ] \
  [ _bark_v_1<12:18> LBL: h1 ARG0: e2 ARG1: x3 ] > \
  HCONS: < h0 qeq h1 h5 qeq h7 > ]";

fn corpus(n: usize) -> String {
  (0..n)
    .map(|i| if i % 2 == 0 { KIM_SLEEPS } else { BIG_DOG })
    .collect::<Vec<_>>()
    .join("\n")
}

fn read_all(s: &str) -> Vec<Xmrs> {
  simplemrs::loads(s).filter_map(Result::ok).collect()
}

fn criterion_benchmark(c: &mut Criterion) {
  let corpus = corpus(100);
  let ms = read_all(&corpus);

  c.bench_function("read simplemrs corpus", |b| {
    b.iter(|| read_all(black_box(&corpus)))
  });

  c.bench_function("write simplemrs corpus", |b| {
    b.iter(|| simplemrs::dumps(black_box(&ms), &WriteOptions::pretty()))
  });

  c.bench_function("write simpledmrs corpus", |b| {
    b.iter(|| simpledmrs::dumps(black_box(&ms), &WriteOptions::default()))
  });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
