//! A regression test for the "motor_retrofit" example
use regression::run_regression_test;

#[test]
fn test_regression_motor_retrofit() {
    run_regression_test("motor_retrofit");
}
