use glam::{Vec2, vec2};

const TRANSLATION_COUNT: usize = 10;

/// An interface for a test case. The outcome of every case in this crate
/// must not change when the whole scene is moved by some offset.
pub trait TestCase: Copy + std::fmt::Debug {
    /// The name of the test to use in the test report.
    fn name(&self) -> &'static str;

    /// Run the test and return success or failure.
    /// Details the caller can't see should be printed to stdout.
    fn check(&self) -> bool;
}

pub trait FuzzableTestCase: TestCase {
    /// Move the whole scene by `offset`.
    fn translate(self, offset: Vec2) -> Self;
}

#[allow(dead_code)]
pub fn run_tests_no_fuzz<T: TestCase>(tests: impl IntoIterator<Item = T>) {
    for case in tests.into_iter() {
        println!("Running {:?}", case.name());
        if !case.check() {
            panic!("Test {:?} failed: {case:#?}", case.name());
        }
    }
}

#[allow(dead_code)]
pub fn run_tests<T: FuzzableTestCase>(tests: impl IntoIterator<Item = T>) {
    let extended = tests.into_iter().flat_map(translate_test);
    for case in extended {
        println!("Running {:?}", case.name());
        if !case.check() {
            panic!("Test {:?} failed: {case:#?}", case.name());
        }
    }
}

/// Generates a few copies of the same test, each moved by a random
/// offset. Offsets are multiples of 16 so the float math stays exact.
fn translate_test<T: FuzzableTestCase>(case: T) -> impl IntoIterator<Item = T> {
    let cases = std::iter::repeat_n(case, TRANSLATION_COUNT).map(|case| {
        let x = rand::random_range(-8..8) as f32 * 16.0;
        let y = rand::random_range(-8..8) as f32 * 16.0;
        case.translate(vec2(x, y))
    });
    std::iter::once(case).chain(cases)
}
