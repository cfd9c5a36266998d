#![allow(non_snake_case)]
use RustedJacobian::Examples::jacobian_examples::jacobian_examples;

fn main() {
    // 0 - default demo, 1 - demo configured from TOML, 2 - nalgebra vectors, 3 - single precision
    let example = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<usize>().ok())
        .unwrap_or(0);
    jacobian_examples(example);
}
