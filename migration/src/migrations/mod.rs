pub mod m202510170001_create_documents;
pub mod m202510170002_create_accounts;
