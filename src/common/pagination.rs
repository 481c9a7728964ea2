use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

// Parâmetros de página vindos da query string (?page=1&pageSize=20).
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    // Nunca devolvemos mais que 100 linhas por página.
    pub fn page_size(&self) -> i64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total_count: i64, params: &PageParams) -> Self {
        let page_size = params.page_size();
        // total_pages = ceil(total_count / page_size), em aritmética inteira.
        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + page_size - 1) / page_size
        };
        Self {
            items,
            total_count,
            page: params.page(),
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, page_size: Option<i64>) -> PageParams {
        PageParams { page, page_size }
    }

    #[test]
    fn total_pages_arredonda_para_cima() {
        let p = params(Some(1), Some(20));
        assert_eq!(Paginated::<i32>::new(vec![], 41, &p).total_pages, 3);
        assert_eq!(Paginated::<i32>::new(vec![], 40, &p).total_pages, 2);
        assert_eq!(Paginated::<i32>::new(vec![], 1, &p).total_pages, 1);
        assert_eq!(Paginated::<i32>::new(vec![], 0, &p).total_pages, 0);
    }

    #[test]
    fn page_size_tem_limites() {
        assert_eq!(params(None, None).page_size(), 20);
        assert_eq!(params(None, Some(500)).page_size(), 100);
        assert_eq!(params(None, Some(0)).page_size(), 1);
    }

    #[test]
    fn offset_e_relativo_a_pagina() {
        assert_eq!(params(Some(3), Some(20)).offset(), 40);
        assert_eq!(params(None, None).offset(), 0);
        // Página inválida vira página 1.
        assert_eq!(params(Some(-2), None).offset(), 0);
    }
}
