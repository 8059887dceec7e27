//! End-to-end checks of fan-out, counting and validation through the public API

use matrix_service::{
    Defaults, IncludeParams, Matrix, MatrixValidator, Param, ParamNameSets,
    ParamReferenceValidator, Params, TaskParser, ValidationErrorKind, PARAMS_PREFIX,
};

fn matrix_of_lengths(lengths: &[usize]) -> Matrix {
    Matrix::new(
        lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                Param::array(
                    format!("p{}", i),
                    (0..len).map(|v| format!("v{}", v)).collect::<Vec<_>>(),
                )
            })
            .collect::<Vec<_>>(),
    )
}

fn value_of<'a>(params: &'a Params, name: &str) -> &'a str {
    params
        .get(name)
        .and_then(|p| p.value.as_str())
        .unwrap_or_default()
}

#[test]
fn fan_out_size_matches_product_and_count() {
    for lengths in [vec![1], vec![3], vec![2, 3], vec![4, 1, 2], vec![2, 2, 2, 2]] {
        let matrix = matrix_of_lengths(&lengths);
        let product: usize = lengths.iter().product();

        assert_eq!(matrix.fan_out().len(), product, "lengths {:?}", lengths);
        assert_eq!(matrix.count_combinations(), product, "lengths {:?}", lengths);
    }
}

#[test]
fn earlier_params_vary_fastest() {
    let matrix = matrix_of_lengths(&[2, 3, 2]);
    let result = matrix.fan_out();

    for (index, params) in result.iter().enumerate() {
        assert_eq!(value_of(params, "p0"), format!("v{}", index % 2));
        assert_eq!(value_of(params, "p1"), format!("v{}", (index / 2) % 3));
        assert_eq!(value_of(params, "p2"), format!("v{}", index / 6));
    }
}

#[test]
fn zero_length_array_anywhere_yields_nothing() {
    for lengths in [vec![0], vec![0, 3], vec![3, 0], vec![2, 0, 4]] {
        let matrix = matrix_of_lengths(&lengths);
        assert!(matrix.fan_out().is_empty(), "lengths {:?}", lengths);
        assert_eq!(matrix.count_combinations(), 0);
    }
}

#[test]
fn parsed_task_expands_in_documented_order() {
    let task = TaskParser::parse_task(
        r#"
name: test
matrix:
  params:
    - name: OS
      value: [linux, mac]
    - name: VER
      value: ["1", "2"]
"#,
    )
    .unwrap();

    let matrix = task.matrix.unwrap();
    let rows: Vec<(String, String)> = matrix
        .fan_out()
        .iter()
        .map(|p| (value_of(p, "OS").to_string(), value_of(p, "VER").to_string()))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("linux".to_string(), "1".to_string()),
            ("mac".to_string(), "1".to_string()),
            ("linux".to_string(), "2".to_string()),
            ("mac".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn include_only_matrix_counts_entries_but_does_not_fan_out() {
    let mut matrix = Matrix::default();
    matrix.include.push(IncludeParams::new(
        "extra",
        vec![Param::string("OS", "windows")],
    ));

    assert_eq!(matrix.count_combinations(), 1);
    assert!(matrix.fan_out().is_empty());
}

#[test]
fn bound_check_rejects_before_fan_out() {
    let matrix = matrix_of_lengths(&[4, 5]);
    let names = ParamNameSets::new();

    let errors = MatrixValidator::validate(
        &matrix,
        &[],
        &Defaults::with_max_matrix_combinations_count(10),
        &names,
        &ParamReferenceValidator,
        PARAMS_PREFIX,
    )
    .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, ValidationErrorKind::OutOfBounds);
    let bounds = errors[0].bounds.unwrap();
    assert_eq!((bounds.value, bounds.min, bounds.max), (20, 0, 10));

    assert!(MatrixValidator::validate(
        &matrix,
        &[],
        &Defaults::with_max_matrix_combinations_count(20),
        &names,
        &ParamReferenceValidator,
        PARAMS_PREFIX,
    )
    .is_ok());
}

#[test]
fn concurrent_fan_out_is_identical() {
    let matrix = std::sync::Arc::new(matrix_of_lengths(&[3, 3, 3]));
    let expected = matrix.fan_out();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let matrix = std::sync::Arc::clone(&matrix);
            std::thread::spawn(move || matrix.fan_out())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
