//! 选题排序
//!
//! 界面上勾选的题目 ID 是一个无序集合，组卷时需要按勾选顺序排版。
//! [`SelectionOrder`] 把 ID 在集合中的迭代位置作为排序名次，
//! 集合外的 ID 一律排在最后，不依赖数据库的默认顺序。

use crate::error::ConfigError;
use std::str::FromStr;

/// 确定性的选题排序键
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOrder {
    ids: Vec<i64>,
}

/// 按迭代顺序构造排序键，重复的 ID 保留第一次出现的位置
pub fn order_selection(ids: impl IntoIterator<Item = i64>) -> SelectionOrder {
    let mut ordered: Vec<i64> = Vec::new();
    for id in ids {
        if !ordered.contains(&id) {
            ordered.push(id);
        }
    }
    SelectionOrder { ids: ordered }
}

impl SelectionOrder {
    /// 按排序后的 ID 列表
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// ID 的名次，不在选择中返回 `None`
    pub fn rank(&self, id: i64) -> Option<usize> {
        self.ids.iter().position(|&candidate| candidate == id)
    }

    /// 排序键：选择外的 ID 取 `len()`，排在所有选中项之后
    pub fn sort_key(&self, id: i64) -> usize {
        self.rank(id).unwrap_or(self.ids.len())
    }

    /// 按名次稳定排序
    pub fn sort_by_rank<T>(&self, items: &mut [T], id_of: impl Fn(&T) -> i64) {
        items.sort_by_key(|item| self.sort_key(id_of(item)));
    }

    /// 生成持久化层查询用的 `ORDER BY` 表达式
    ///
    /// ```text
    /// (CASE WHEN id = 5 THEN 0 WHEN id = 2 THEN 1 ELSE 2 END)
    /// ```
    ///
    /// 空选择没有可比较的分支，返回常量 `0`
    pub fn order_by_clause(&self, column: &str) -> String {
        if self.ids.is_empty() {
            return "0".to_string();
        }
        let mut clause = String::from("(CASE");
        for (rank, id) in self.ids.iter().enumerate() {
            clause.push_str(&format!(" WHEN {} = {} THEN {}", column, id, rank));
        }
        clause.push_str(&format!(" ELSE {} END)", self.ids.len()));
        clause
    }
}

impl FromStr for SelectionOrder {
    type Err = ConfigError;

    /// 解析逗号分隔的 ID 列表，例如 `"5, 2, 8"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>().map_err(|_| ConfigError::EnvVarParseFailed {
                    var_name: "EXAM_SELECTION".to_string(),
                    value: s.to_string(),
                    expected_type: "逗号分隔的题目ID".to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(order_selection(ids))
    }
}
