// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use university_records::domain::{Course, Student};

// ==========================================
// Student 构建器
// ==========================================

pub struct StudentBuilder {
    first_name: String,
    last_name: String,
    cnp: String,
    address: String,
    univ_code: String,
    emails: Vec<String>,
    phone_numbers: Vec<String>,
}

impl StudentBuilder {
    pub fn new(cnp: &str) -> Self {
        Self {
            first_name: "Ion".to_string(),
            last_name: "Ionescu".to_string(),
            cnp: cnp.to_string(),
            address: "Bd. Carol I 11".to_string(),
            univ_code: "UAIC".to_string(),
            emails: vec!["ion@example.com".to_string()],
            phone_numbers: Vec::new(),
        }
    }

    pub fn name(mut self, first: &str, last: &str) -> Self {
        self.first_name = first.to_string();
        self.last_name = last.to_string();
        self
    }

    pub fn emails(mut self, emails: &[&str]) -> Self {
        self.emails = emails.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn phones(mut self, phones: &[&str]) -> Self {
        self.phone_numbers = phones.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn univ_code(mut self, code: &str) -> Self {
        self.univ_code = code.to_string();
        self
    }

    pub fn build(self) -> Student {
        Student {
            id: 0,
            first_name: self.first_name,
            last_name: self.last_name,
            cnp: self.cnp,
            address: self.address,
            univ_code: self.univ_code,
            emails: self.emails,
            phone_numbers: self.phone_numbers,
        }
    }
}

// ==========================================
// Course 构建器
// ==========================================

pub struct CourseBuilder {
    name: String,
    credits: i32,
    cost: f64,
    min_cost_per_credit: f64,
    max_cost_per_credit: f64,
}

impl CourseBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            credits: 5,
            cost: 500.0,
            min_cost_per_credit: 80.0,
            max_cost_per_credit: 120.0,
        }
    }

    pub fn credits(mut self, credits: i32) -> Self {
        self.credits = credits;
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn cost_per_credit(mut self, min: f64, max: f64) -> Self {
        self.min_cost_per_credit = min;
        self.max_cost_per_credit = max;
        self
    }

    pub fn build(self) -> Course {
        Course {
            id: 0,
            description: format!("{} description", self.name),
            name: self.name,
            credits: self.credits,
            cost: self.cost,
            min_cost_per_credit: self.min_cost_per_credit,
            max_cost_per_credit: self.max_cost_per_credit,
        }
    }
}
