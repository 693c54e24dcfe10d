//! Crab Gateway - 多租户餐厅 POS 订单/班次状态转换网关
//!
//! # 架构概述
//!
//! 每个变更请求走同一条管线：认证 → 角色解析 → 租户健康 → 加载实体 →
//! 租户隔离 → 不变式校验 → 条件写入 → 审计 → 响应。
//!
//! - **不变式注册表** (`invariants`): 命名业务规则，网关与诊断共用
//! - **动作描述表** (`actions`): 动作 → 角色、相关不变式、副作用
//! - **状态转换网关** (`gateway`): 每个动作一个处理器
//! - **支付拆分** (`payment`): 纯计算
//! - **诊断推理** (`diagnostics`): 只读解释
//!
//! # 模块结构
//!
//! ```text
//! crab-gateway/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── gateway/       # 转换管线
//! ├── invariants/    # 不变式注册表
//! ├── actions/       # 动作描述表、订单生命周期
//! ├── payment/       # 支付拆分
//! ├── diagnostics/   # 诊断推理
//! ├── audit/         # 审计日志
//! ├── notify/        # 下游通知
//! ├── db/            # SQLite 存储层
//! └── utils/         # 日志、金额
//! ```

pub mod actions;
pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod diagnostics;
pub mod gateway;
pub mod invariants;
pub mod notify;
pub mod payment;
pub mod utils;

// Re-export 公共类型
pub use auth::{Caller, JwtService};
pub use core::{Config, Server, ServerState};
pub use gateway::Gateway;

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};
