use crate::config::CatalogConfig;
use crate::display::trace;
use crate::error::CatalogError;
use crate::meta::{License, Origin, Source};
use crate::processing_log::{self, ProcessingLog, ProcessingLogGuard};
use crate::table::{JoinHow, Table};
use crate::variable::{Reduction, Series, Variable};
use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

impl From<CatalogError> for PyErr {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ColumnNotFound(name) => PyKeyError::new_err(name),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

fn series_from_py(values: &Bound<'_, PyAny>) -> PyResult<Series> {
    if let Ok(v) = values.extract::<Vec<bool>>() {
        return Ok(Series::Bool(v));
    }
    if let Ok(v) = values.extract::<Vec<i64>>() {
        return Ok(Series::Int(v));
    }
    if let Ok(v) = values.extract::<Vec<f64>>() {
        return Ok(Series::Float(v));
    }
    if let Ok(v) = values.extract::<Vec<Option<String>>>() {
        return Ok(Series::Str(v));
    }
    Err(PyValueError::new_err("Column values must be a list of bool, int, float or str"))
}

fn reduction_from_name(name: &str) -> PyResult<Reduction> {
    Ok(match name {
        "sum" => Reduction::Sum,
        "mean" => Reduction::Mean,
        "min" => Reduction::Min,
        "max" => Reduction::Max,
        "count" => Reduction::Count,
        "first" => Reduction::First,
        "last" => Reduction::Last,
        _ => return Err(PyValueError::new_err(format!("Invalid reduction '{}'", name))),
    })
}

/// Context manager enabling (or disabling) processing logs for its block.
#[pyclass(unsendable, name = "ProcessingLogScope")]
pub struct PyProcessingLogScope {
    enabled: bool,
    guard: Option<ProcessingLogGuard>,
}

#[pymethods]
impl PyProcessingLogScope {
    #[new]
    #[pyo3(signature = (enabled = true))]
    pub fn new(enabled: bool) -> Self {
        Self { enabled, guard: None }
    }

    fn __enter__(mut slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf.guard = Some(if slf.enabled {
            processing_log::enable_processing_log()
        } else {
            processing_log::disable_processing_log()
        });
        slf
    }

    fn __exit__(
        &mut self,
        _exc_type: Option<Bound<'_, PyAny>>,
        _exc_value: Option<Bound<'_, PyAny>>,
        _traceback: Option<Bound<'_, PyAny>>,
    ) -> bool {
        self.guard.take();
        false
    }
}

#[pyclass(name = "Variable")]
#[derive(Debug, Clone)]
pub struct PyVariable {
    pub inner: Variable,
}

type VariableOp = fn(&Variable, &Variable) -> crate::error::Result<Variable>;
type ScalarOp = fn(&Variable, f64) -> crate::error::Result<Variable>;

impl PyVariable {
    fn binary(&self, other: &Bound<'_, PyAny>, op: VariableOp, scalar: ScalarOp) -> PyResult<Self> {
        let inner = match other.extract::<PyRef<'_, PyVariable>>() {
            Ok(rhs) => op(&self.inner, &rhs.inner)?,
            Err(_) => scalar(&self.inner, other.extract::<f64>()?)?,
        };
        Ok(Self { inner })
    }
}

#[pymethods]
impl PyVariable {
    #[new]
    #[pyo3(signature = (values, name = None))]
    pub fn new(values: &Bound<'_, PyAny>, name: Option<String>) -> PyResult<Self> {
        let values = series_from_py(values)?;
        Ok(Self { inner: Variable { name, values, metadata: Default::default() } })
    }

    #[getter]
    pub fn name(&self) -> Option<String> { self.inner.name.clone() }

    #[getter]
    pub fn title(&self) -> Option<String> { self.inner.metadata.title.clone() }

    #[setter]
    pub fn set_title(&mut self, title: Option<String>) { self.inner.metadata.title = title; }

    #[getter]
    pub fn unit(&self) -> Option<String> { self.inner.metadata.unit.clone() }

    #[setter]
    pub fn set_unit(&mut self, unit: Option<String>) { self.inner.metadata.unit = unit; }

    pub fn add_source(&mut self, name: String) {
        crate::meta::push_unique(&mut self.inner.metadata.sources, Source::new(name));
    }

    /// The processing log as a list of JSON objects, serialized to a string.
    pub fn processing_log(&self) -> String { self.inner.metadata.processing_log.to_json() }

    pub fn to_list(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        Ok(match &self.inner.values {
            Series::Float(v) => v.clone().into_pyobject(py)?.into_any().unbind(),
            Series::Int(v) => v.clone().into_pyobject(py)?.into_any().unbind(),
            Series::Bool(v) => v.clone().into_pyobject(py)?.into_any().unbind(),
            Series::Str(v) => v.clone().into_pyobject(py)?.into_any().unbind(),
        })
    }

    pub fn rename(&self, name: String) -> Self { Self { inner: self.inner.rename(name) } }

    fn __add__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.binary(other, |a, b| a.add(b), |a, x| a.add(x))
    }

    fn __sub__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.binary(other, |a, b| a.sub(b), |a, x| a.sub(x))
    }

    fn __rsub__(&self, other: f64) -> PyResult<Self> {
        Ok(Self { inner: self.inner.rsub(other)? })
    }

    fn __mul__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.binary(other, |a, b| a.mul(b), |a, x| a.mul(x))
    }

    fn __truediv__(&self, other: &Bound<'_, PyAny>) -> PyResult<Self> {
        self.binary(other, |a, b| a.div(b), |a, x| a.div(x))
    }

    fn __rtruediv__(&self, other: f64) -> PyResult<Self> {
        Ok(Self { inner: self.inner.rdiv(other)? })
    }

    fn __len__(&self) -> usize { self.inner.len() }
}

#[pyclass(name = "Table")]
#[derive(Debug, Clone, Default)]
pub struct PyTable {
    pub inner: Table,
}

#[pymethods]
impl PyTable {
    #[new]
    #[pyo3(signature = (columns = None))]
    pub fn new(columns: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let mut variables = Vec::new();
        if let Some(columns) = columns {
            for (name, values) in columns.iter() {
                variables.push(Variable::new(name.extract::<String>()?, series_from_py(&values)?));
            }
        }
        Ok(Self { inner: Table::from_variables(variables)? })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.inner.column_names().into_iter().map(str::to_string).collect()
    }

    #[getter]
    pub fn primary_key(&self) -> Vec<String> { self.inner.primary_key.clone() }

    pub fn set_index(&mut self, keys: Vec<String>) -> PyResult<()> {
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        Ok(self.inner.set_index(&keys)?)
    }

    fn __getitem__(&self, name: &str) -> PyResult<PyVariable> {
        Ok(PyVariable { inner: self.inner.get(name)?.clone() })
    }

    fn __setitem__(&mut self, name: String, var: PyRef<'_, PyVariable>) -> PyResult<()> {
        Ok(self.inner.insert(name, var.inner.clone())?)
    }

    fn __len__(&self) -> usize { self.inner.n_rows() }

    pub fn add_source(&mut self, name: String) { self.inner.add_source(Source::new(name)); }

    pub fn add_license(&mut self, name: String) { self.inner.add_license(License::new(name)); }

    pub fn add_origin(&mut self, producer: String, title: String) { self.inner.add_origin(Origin::new(producer, title)); }

    pub fn rename_columns(&self, mapping: Vec<(String, String)>) -> PyResult<Self> {
        let mapping: Vec<(&str, &str)> = mapping.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        Ok(Self { inner: self.inner.rename_columns(&mapping)? })
    }

    #[pyo3(signature = (right, on, how = "inner"))]
    pub fn merge(&self, right: &PyTable, on: Vec<String>, how: &str) -> PyResult<Self> {
        let how = match how {
            "inner" => JoinHow::Inner,
            "left" => JoinHow::Left,
            "outer" => JoinHow::Outer,
            _ => return Err(PyValueError::new_err(format!("Invalid join '{}'", how))),
        };
        let on: Vec<&str> = on.iter().map(String::as_str).collect();
        Ok(Self { inner: self.inner.merge(&right.inner, &on, how)? })
    }

    pub fn groupby_agg(&self, keys: Vec<String>, reduction: &str) -> PyResult<Self> {
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let reduction = reduction_from_name(reduction)?;
        Ok(Self { inner: self.inner.groupby(&keys)?.agg(reduction)? })
    }

    pub fn concat(&self, others: Vec<PyRef<'_, PyTable>>) -> PyResult<Self> {
        let others: Vec<&Table> = others.iter().map(|t| &t.inner).collect();
        Ok(Self { inner: self.inner.concat(&others)? })
    }
}

#[pyfunction]
#[pyo3(signature = (enabled = true))]
fn enable_processing_log(enabled: bool) -> PyProcessingLogScope {
    PyProcessingLogScope::new(enabled)
}

/// A scope following the `PROCESSING_LOG` environment variable.
#[pyfunction]
fn processing_log_from_env() -> PyProcessingLogScope {
    PyProcessingLogScope::new(CatalogConfig::from_env().processing_log)
}

#[pyfunction]
fn is_processing_log_enabled() -> bool {
    processing_log::is_processing_log_enabled()
}

#[pyfunction]
fn target_hash(operation: &str, parents: Vec<String>) -> String {
    processing_log::target_hash(operation, &parents)
}

/// Squeezes a processing log given as JSON, returning JSON.
#[pyfunction]
fn preprocess_log(log_json: &str) -> PyResult<String> {
    Ok(ProcessingLog::from_json(log_json)?.preprocessed().to_json())
}

#[pyfunction]
fn format_trace(log_json: &str, target: &str) -> PyResult<String> {
    Ok(trace::format_trace(&ProcessingLog::from_json(log_json)?, target))
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyProcessingLogScope>()?;
    m.add_class::<PyVariable>()?;
    m.add_class::<PyTable>()?;
    m.add_function(wrap_pyfunction!(enable_processing_log, m)?)?;
    m.add_function(wrap_pyfunction!(processing_log_from_env, m)?)?;
    m.add_function(wrap_pyfunction!(is_processing_log_enabled, m)?)?;
    m.add_function(wrap_pyfunction!(target_hash, m)?)?;
    m.add_function(wrap_pyfunction!(preprocess_log, m)?)?;
    m.add_function(wrap_pyfunction!(format_trace, m)?)?;
    Ok(())
}
