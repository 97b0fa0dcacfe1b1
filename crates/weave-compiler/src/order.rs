//! Execution order from import/export bindings

use std::collections::HashMap;

use weave_ast::Header;

use crate::CompileError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Indices of `headers` ordered so exporters run before their importers
///
/// Files keep their given order where no binding constrains them. Imports
/// no file exports are left to the script module resolver.
pub fn execution_order(names: &[String], headers: &[&Header]) -> Result<Vec<usize>, CompileError> {
    let mut exporters: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        for binding in &header.exports {
            exporters.entry(binding.target.as_str()).or_default().push(index);
        }
    }

    let dependencies: Vec<Vec<usize>> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let mut deps: Vec<usize> = header
                .imports
                .iter()
                .flat_map(|binding| exporters.get(binding.target.as_str()).into_iter().flatten())
                .copied()
                .filter(|&dep| dep != index)
                .collect();
            deps.sort_unstable();
            deps.dedup();
            deps
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; headers.len()];
    let mut order = Vec::with_capacity(headers.len());
    let mut path = Vec::new();
    for index in 0..headers.len() {
        visit(index, &dependencies, &mut marks, &mut order, &mut path, names)?;
    }
    Ok(order)
}

fn visit(
    index: usize,
    dependencies: &[Vec<usize>],
    marks: &mut [Mark],
    order: &mut Vec<usize>,
    path: &mut Vec<usize>,
    names: &[String],
) -> Result<(), CompileError> {
    match marks[index] {
        Mark::Done => return Ok(()),
        Mark::Visiting => {
            let start = path.iter().position(|&i| i == index).unwrap_or(0);
            let mut files: Vec<String> = path[start..].iter().map(|&i| names[i].clone()).collect();
            files.push(names[index].clone());
            return Err(CompileError::ImportCycle { files });
        }
        Mark::Unvisited => {}
    }
    marks[index] = Mark::Visiting;
    path.push(index);
    for &dep in &dependencies[index] {
        visit(dep, dependencies, marks, order, path, names)?;
    }
    path.pop();
    marks[index] = Mark::Done;
    order.push(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_ast::Binding;

    fn header(imports: &[&str], exports: &[&str]) -> Header {
        let binding = |target: &&str| Binding {
            target: target.to_string(),
            name: "x".to_string(),
            line: 1,
        };
        Header {
            imports: imports.iter().map(binding).collect(),
            exports: exports.iter().map(binding).collect(),
        }
    }

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("f{i}")).collect()
    }

    #[test]
    fn exporters_run_first() {
        let headers = [header(&["lib"], &[]), header(&[], &[]), header(&[], &["lib"])];
        let refs: Vec<&Header> = headers.iter().collect();
        assert_eq!(execution_order(&names(3), &refs).expect("order"), vec![2, 0, 1]);
    }

    #[test]
    fn cycles_are_reported() {
        let headers = [header(&["b"], &["a"]), header(&["a"], &["b"])];
        let refs: Vec<&Header> = headers.iter().collect();
        let err = execution_order(&names(2), &refs).unwrap_err();
        let CompileError::ImportCycle { files } = err else {
            panic!("expected a cycle");
        };
        assert_eq!(files, vec!["f0", "f1", "f0"]);
    }

    #[test]
    fn unknown_imports_do_not_constrain() {
        let headers = [header(&["file_module"], &[]), header(&[], &[])];
        let refs: Vec<&Header> = headers.iter().collect();
        assert_eq!(execution_order(&names(2), &refs).expect("order"), vec![0, 1]);
    }
}
