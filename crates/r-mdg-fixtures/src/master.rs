//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! Meter and terminal master tables, stamped from the topology.
use chrono::NaiveDateTime;
use r_mdg_common::time::timestamp_serde;
use serde::Serialize;

use crate::context::RunContext;
use crate::entities::{Meter, Terminal, Topology};
use crate::rng::{round_to, FixtureRng};
use crate::schema::{Column, Record, TableId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MeterMasterRecord {
    pub run_meter_id: String,
    pub area_code: String,
    #[serde(with = "timestamp_serde")]
    pub lt_chk_date: NaiveDateTime,
    pub ma_auxil_table_signs: &'static str,
    pub pr_code: &'static str,
    pub manu_flag: &'static str,
    pub ed_bgn_time: Option<String>,
    pub ed_ratio: Option<f64>,
    pub ed_type: Option<String>,
    pub ed_end_time: Option<String>,
    pub ed_amt: Option<f64>,
    pub supply_org_code: String,
    pub pf_threshhold: &'static str,
    pub made_no: String,
    pub time_digit_code: &'static str,
    #[serde(with = "timestamp_serde")]
    pub create_time: NaiveDateTime,
    pub arrive_batch: String,
    pub agree_tip_prc: f64,
    pub agree_peak_prc: f64,
    pub agree_flat_prc: f64,
    pub agree_prc: f64,
    pub agree_valley_prc: f64,
    pub plant_area: u64,
    pub old_read_no: Option<String>,
    pub param_id: String,
    pub remarks: &'static str,
    pub rp_need_amt: &'static str,
    pub install_position: String,
    #[serde(with = "timestamp_serde")]
    pub install_date: NaiveDateTime,
    pub switch_flag: &'static str,
    pub read_order: usize,
    #[serde(with = "timestamp_serde")]
    pub operated_time: NaiveDateTime,
    #[serde(with = "timestamp_serde")]
    pub data_plat_chg_time: NaiveDateTime,
    pub super_capacit_flag: &'static str,
    pub direct_collect_send_flag: &'static str,
    pub prepay_deduct_flag: &'static str,
    pub baud_rate: &'static str,
    pub phase_code: u64,
    pub box_cabinet_position_no: usize,
    pub lat: f64,
    pub lng: f64,
    pub total_factor: f64,
    pub market_prj_id: String,
    pub meter_digits_code: &'static str,
    pub meter_box_cabinet_id: String,
    pub equ_id: String,
    pub equ_main_person_id: String,
    pub cc_switch_type: &'static str,
    pub assets_no: String,
    pub rotate_cycle: &'static str,
    pub rotate_vaild_date: Option<String>,
    pub maintain_group: &'static str,
    pub oper_comm_protocol: &'static str,
    pub oper_comm_mode: &'static str,
    pub overdraft_flag: &'static str,
    pub overdraft_quota: Option<f64>,
    pub comm_addr1: String,
    pub comm_addr2: Option<String>,
    pub comm_mode_code: &'static str,
    pub comm_protocol_code: &'static str,
    pub area_sort_code: &'static str,
    pub preset_amt: f64,
    pub warn_threshold1: &'static str,
    pub warn_threshold2: &'static str,
    pub warn_threshold3: &'static str,
}

impl Record for MeterMasterRecord {
    const TABLE: TableId = TableId::MeterMaster;
    const COLUMNS: &'static [Column] = &[
        Column::new("RUN_METER_ID", "主键,运行电能表的唯一标识"),
        Column::new("AREA_CODE", "用户所在的地区编码"),
        Column::new("LT_CHK_DATE", "上次现场检验日期"),
        Column::new("MA_AUXIL_TABLE_SIGNS", "主副表标志"),
        Column::new("PR_CODE", "产权归属"),
        Column::new("MANU_FLAG", "是否是人工控制"),
        Column::new("ED_BGN_TIME", "代扣开始时间"),
        Column::new("ED_RATIO", "代扣比例"),
        Column::new("ED_TYPE", "代扣类型"),
        Column::new("ED_END_TIME", "代扣结束时间"),
        Column::new("ED_AMT", "代扣金额"),
        Column::new("SUPPLY_ORG_CODE", "供电单位编码"),
        Column::new("PF_THRESHHOLD", "停电阀值"),
        Column::new("MADE_NO", "电能表出厂编号"),
        Column::new("TIME_DIGIT_CODE", "分时位数"),
        Column::new("CREATE_TIME", "数据创建时间"),
        Column::new("ARRIVE_BATCH", "到货批次号"),
        Column::new("AGREE_TIP_PRC", "协议尖电价"),
        Column::new("AGREE_PEAK_PRC", "协议峰电价"),
        Column::new("AGREE_FLAT_PRC", "协议平电价"),
        Column::new("AGREE_PRC", "协议电价"),
        Column::new("AGREE_VALLEY_PRC", "协议谷电价"),
        Column::new("PLANT_AREA", "面积"),
        Column::new("OLD_READ_NO", "原抄表号"),
        Column::new("PARAM_ID", "参数标识"),
        Column::new("REMARKS", "备注"),
        Column::new("RP_NEED_AMT", "复电允许金额"),
        Column::new("INSTALL_POSITION", "电能表安装的物理位置"),
        Column::new("INSTALL_DATE", "安装日期"),
        Column::new("SWITCH_FLAG", "是否带开关"),
        Column::new("READ_ORDER", "抄表顺序号"),
        Column::new("OPERATED_TIME", "数据最近一次变更时间"),
        Column::new("DATA_PLAT_CHG_TIME", "数据资源管理平台变更时间"),
        Column::new("SUPER_CAPACIT_FLAG", "是否安装超级电容"),
        Column::new("DIRECT_COLLECT_SEND_FLAG", "是否实现直采直送"),
        Column::new("PREPAY_DEDUCT_FLAG", "本条记录是否开通预付费代扣"),
        Column::new("BAUD_RATE", "电能表的波特率"),
        Column::new("PHASE_CODE", "相位"),
        Column::new("BOX_CABINET_POSITION_NO", "箱(柜)内位置号"),
        Column::new("LAT", "纬度"),
        Column::new("LNG", "经度"),
        Column::new("TOTAL_FACTOR", "电能表综合倍率"),
        Column::new("MARKET_PRJ_ID", "营销项目标识"),
        Column::new("METER_DIGITS_CODE", "表码位数"),
        Column::new("METER_BOX_CABINET_ID", "表箱(柜)设备唯一标识"),
        Column::new("EQU_ID", "电能计量设备唯一标识"),
        Column::new("EQU_MAIN_PERSON_ID", "设备运维主人标识"),
        Column::new("CC_SWITCH_TYPE", "费控开关型号"),
        Column::new("ASSETS_NO", "电能表资产编号(条形码)"),
        Column::new("ROTATE_CYCLE", "轮换周期"),
        Column::new("ROTATE_VAILD_DATE", "轮换有效日期"),
        Column::new("MAINTAIN_GROUP", "运维班组"),
        Column::new("OPER_COMM_PROTOCOL", "运行通信协议"),
        Column::new("OPER_COMM_MODE", "运行通信方式"),
        Column::new("OVERDRAFT_FLAG", "是否允许透支标志"),
        Column::new("OVERDRAFT_QUOTA", "透支限额"),
        Column::new("COMM_ADDR1", "通讯地址1"),
        Column::new("COMM_ADDR2", "通讯地址2"),
        Column::new("COMM_MODE_CODE", "通讯方式"),
        Column::new("COMM_PROTOCOL_CODE", "通讯规约"),
        Column::new("AREA_SORT_CODE", "面积类型代码"),
        Column::new("PRESET_AMT", "预置电费金额"),
        Column::new("WARN_THRESHOLD1", "预警阀值1"),
        Column::new("WARN_THRESHOLD2", "预警阀值2"),
        Column::new("WARN_THRESHOLD3", "预警阀值3"),
    ];
}

/// Communication mode and protocol every meter reports.
pub const METER_COMM_MODE: &str = "RS485";
pub const METER_COMM_PROTOCOL: &str = "DL/T645-2007";

pub fn meter_master(topology: &Topology, ctx: &RunContext, rng: &mut FixtureRng) -> Vec<MeterMasterRecord> {
    topology
        .meters()
        .iter()
        .enumerate()
        .map(|(i, meter)| meter_row(meter, i + 1, ctx, rng))
        .collect()
}

fn meter_row(meter: &Meter, position: usize, ctx: &RunContext, rng: &mut FixtureRng) -> MeterMasterRecord {
    MeterMasterRecord {
        run_meter_id: meter.id.clone(),
        area_code: ctx.area_code.clone(),
        lt_chk_date: ctx.days_ago(rng.int(30..=365)),
        ma_auxil_table_signs: meter.role.sign(),
        pr_code: "1",
        manu_flag: "0",
        ed_bgn_time: None,
        ed_ratio: None,
        ed_type: None,
        ed_end_time: None,
        ed_amt: None,
        supply_org_code: meter.supply_org.clone(),
        pf_threshhold: "100.00",
        made_no: rng.tagged("MFG", 100_000..=999_999),
        time_digit_code: "6.2",
        create_time: ctx.days_ago(180),
        arrive_batch: rng.tagged("BATCH", 1000..=9999),
        agree_tip_prc: rng.uniform_rounded(0.8, 1.2, 4),
        agree_peak_prc: rng.uniform_rounded(0.6, 0.9, 4),
        agree_flat_prc: rng.uniform_rounded(0.4, 0.6, 4),
        agree_prc: rng.uniform_rounded(0.5, 0.7, 4),
        agree_valley_prc: rng.uniform_rounded(0.2, 0.4, 4),
        plant_area: rng.int(50..=200),
        old_read_no: None,
        param_id: rng.id("PARAM"),
        remarks: "正常运行",
        rp_need_amt: "50.00",
        install_position: meter.install_position(),
        install_date: ctx.days_ago(rng.int(365..=1095)),
        switch_flag: "1",
        read_order: position,
        operated_time: ctx.generated_at,
        data_plat_chg_time: ctx.generated_at,
        super_capacit_flag: "0",
        direct_collect_send_flag: "1",
        prepay_deduct_flag: "0",
        baud_rate: "9600",
        phase_code: rng.int(1..=3),
        box_cabinet_position_no: position,
        lat: rng.uniform_rounded(22.0, 24.0, 6),
        lng: rng.uniform_rounded(113.0, 115.0, 6),
        total_factor: rng.uniform_rounded(1.0, 10.0, 3),
        market_prj_id: rng.id("PRJ"),
        meter_digits_code: "6.2",
        meter_box_cabinet_id: rng.id("BOX"),
        equ_id: meter.equ_id.clone(),
        equ_main_person_id: rng.id("PER"),
        cc_switch_type: "TYPE_A",
        assets_no: meter.assets_no.clone(),
        rotate_cycle: "8",
        rotate_vaild_date: None,
        maintain_group: "运维班组A",
        oper_comm_protocol: "DL/T645",
        oper_comm_mode: METER_COMM_MODE,
        overdraft_flag: "0",
        overdraft_quota: None,
        comm_addr1: meter.comm_addr.clone(),
        comm_addr2: None,
        comm_mode_code: METER_COMM_MODE,
        comm_protocol_code: METER_COMM_PROTOCOL,
        area_sort_code: "1",
        preset_amt: round_to(rng.uniform(100.0, 500.0), 2),
        warn_threshold1: "100.00",
        warn_threshold2: "50.00",
        warn_threshold3: "20.00",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TerminalMasterRecord {
    pub run_term_id: String,
    pub ip_addr: String,
    #[serde(with = "timestamp_serde")]
    pub lt_chk_date: NaiveDateTime,
    pub up_comm_code: &'static str,
    pub up_protocol_code: &'static str,
    pub up_channel_1: &'static str,
    pub up_channel_2: &'static str,
    pub down_comm_code: &'static str,
    pub down_protocol_code: &'static str,
    pub main_comm_mode: &'static str,
    pub main_term_flag: &'static str,
    pub main_term_comm_addr: String,
    pub supply_org_no: String,
    pub time_mp_function_code: &'static str,
    #[serde(with = "timestamp_serde")]
    pub create_time: NaiveDateTime,
    pub arrive_batch: String,
    pub param_id: String,
    pub area_code: String,
    pub seserve_comm_mode: &'static str,
    pub safe_inter_mode: &'static str,
    pub install_addr: String,
    #[serde(with = "timestamp_serde")]
    pub install_date: NaiveDateTime,
    pub wire_mode_code: &'static str,
    #[serde(with = "timestamp_serde")]
    pub operated_time: NaiveDateTime,
    #[serde(with = "timestamp_serde")]
    pub data_plat_chg_time: NaiveDateTime,
    pub is_install_branch_equ: &'static str,
    pub factory_id: String,
    pub elec_cust_no: String,
    pub offline_flag: &'static str,
    pub box_cabinet_position_no: &'static str,
    pub lat: f64,
    pub term_useage: &'static str,
    pub lng: f64,
    pub total_factor: f64,
    pub market_prj_id: String,
    pub market_prj_no: String,
    pub meter_box_cabinet_id: String,
    pub metering_point_number: String,
    pub equ_id: String,
    pub equ_model_code: String,
    pub equ_sort_code: &'static str,
    pub equ_type_code: &'static str,
    pub equ_main_person_id: String,
    pub assets_no: String,
    pub converter1: &'static str,
    pub converter2: &'static str,
    pub rotate_cycle: &'static str,
    pub maintain_group: &'static str,
    pub run_up_comm_code: &'static str,
    pub run_down_comm_code: &'static str,
    pub comm_addr: String,
    pub down_comm_channel: &'static str,
    pub metering_point_name: String,
    pub comm_type: &'static str,
    pub protocol_type: &'static str,
    pub term_type_code: &'static str,
    pub preset_amt: f64,
    pub remarks: &'static str,
    pub manufacturer_name: &'static str,
}

impl Record for TerminalMasterRecord {
    const TABLE: TableId = TableId::TerminalMaster;
    const COLUMNS: &'static [Column] = &[
        Column::new("RUN_TERM_ID", "运行计量自动化终端标识"),
        Column::new("IP_ADDR", "IP地址"),
        Column::new("LT_CHK_DATE", "上次检验日期"),
        Column::new("UP_COMM_CODE", "上行通讯方式代码"),
        Column::new("UP_PROTOCOL_CODE", "上行通讯规约代码"),
        Column::new("UP_CHANNEL_1", "上行通道1"),
        Column::new("UP_CHANNEL_2", "上行通道2"),
        Column::new("DOWN_COMM_CODE", "下行通讯方式代码"),
        Column::new("DOWN_PROTOCOL_CODE", "下行通讯规约代码"),
        Column::new("MAIN_COMM_MODE", "主用通信方式"),
        Column::new("MAIN_TERM_FLAG", "主终端标志"),
        Column::new("MAIN_TERM_COMM_ADDR", "主终端通信地址"),
        Column::new("SUPPLY_ORG_NO", "供电单位编码"),
        Column::new("TIME_MP_FUNCTION_CODE", "分时计量功能代码"),
        Column::new("CREATE_TIME", "创建时间"),
        Column::new("ARRIVE_BATCH", "到货批次"),
        Column::new("PARAM_ID", "参数标识"),
        Column::new("AREA_CODE", "地区编码"),
        Column::new("SESERVE_COMM_MODE", "备用通信方式"),
        Column::new("SAFE_INTER_MODE", "安全接入方式"),
        Column::new("INSTALL_ADDR", "安装地址"),
        Column::new("INSTALL_DATE", "安装日期"),
        Column::new("WIRE_MODE_CODE", "接线方式代码"),
        Column::new("OPERATED_TIME", "数据最近一次变更时间"),
        Column::new("DATA_PLAT_CHG_TIME", "数据资源管理平台变更时间"),
        Column::new("IS_INSTALL_BRANCH_EQU", "是否安装分支设备"),
        Column::new("FACTORY_ID", "厂家标识"),
        Column::new("ELEC_CUST_NO", "用电客户号"),
        Column::new("OFFLINE_FLAG", "离线标志"),
        Column::new("BOX_CABINET_POSITION_NO", "箱(柜)内位置号"),
        Column::new("LAT", "纬度"),
        Column::new("TERM_USEAGE", "终端用途"),
        Column::new("LNG", "经度"),
        Column::new("TOTAL_FACTOR", "综合倍率"),
        Column::new("MARKET_PRJ_ID", "营销项目标识"),
        Column::new("MARKET_PRJ_NO", "营销项目编号"),
        Column::new("METER_BOX_CABINET_ID", "表箱(柜)设备唯一标识"),
        Column::new("METERING_POINT_NUMBER", "计量点编号"),
        Column::new("EQU_ID", "电能计量设备唯一标识"),
        Column::new("EQU_MODEL_CODE", "设备型号代码"),
        Column::new("EQU_SORT_CODE", "设备类别代码"),
        Column::new("EQU_TYPE_CODE", "设备类型代码"),
        Column::new("EQU_MAIN_PERSON_ID", "设备运维主人标识"),
        Column::new("ASSETS_NO", "资产编号"),
        Column::new("CONVERTER1", "转换器1"),
        Column::new("CONVERTER2", "转换器2"),
        Column::new("ROTATE_CYCLE", "轮换周期"),
        Column::new("MAINTAIN_GROUP", "运维班组"),
        Column::new("RUN_UP_COMM_CODE", "运行上行通信代码"),
        Column::new("RUN_DOWN_COMM_CODE", "运行下行通信代码"),
        Column::new("COMM_ADDR", "通讯地址"),
        Column::new("DOWN_COMM_CHANNEL", "下行通信信道"),
        Column::new("METERING_POINT_NAME", "计量点名称"),
        Column::new("COMM_TYPE", "通信类型"),
        Column::new("PROTOCOL_TYPE", "规约类型"),
        Column::new("TERM_TYPE_CODE", "终端类型代码"),
        Column::new("PRESET_AMT", "预置金额"),
        Column::new("REMARKS", "备注"),
        Column::new("MANUFACTURER_NAME", "生产厂家名称"),
    ];
}

pub fn terminal_master(topology: &Topology, ctx: &RunContext, rng: &mut FixtureRng) -> Vec<TerminalMasterRecord> {
    topology
        .terminals()
        .map(|terminal| {
            let point_name = topology
                .district(&terminal.district)
                .map(|d| format!("{}计量点", d.name))
                .unwrap_or_else(|| format!("{}计量点", terminal.district));
            terminal_row(terminal, point_name, ctx, rng)
        })
        .collect()
}

fn terminal_row(terminal: &Terminal, metering_point_name: String, ctx: &RunContext, rng: &mut FixtureRng) -> TerminalMasterRecord {
    TerminalMasterRecord {
        run_term_id: terminal.run_term_id.clone(),
        ip_addr: rng.ipv4(),
        lt_chk_date: ctx.days_ago(rng.int(30..=365)),
        up_comm_code: "GPRS",
        up_protocol_code: "DL/T645-2007",
        up_channel_1: "CHANNEL_1",
        up_channel_2: "CHANNEL_2",
        down_comm_code: "RS485",
        down_protocol_code: "DL/T645-2007",
        main_comm_mode: "GPRS",
        main_term_flag: "1",
        main_term_comm_addr: rng.int(1_000_000_000..=9_999_999_999).to_string(),
        supply_org_no: terminal.supply_org.clone(),
        time_mp_function_code: "1",
        create_time: ctx.days_ago(180),
        arrive_batch: terminal.arrive_batch.clone(),
        param_id: rng.id("PARAM"),
        area_code: ctx.area_code.clone(),
        seserve_comm_mode: "GPRS",
        safe_inter_mode: "1",
        install_addr: terminal.install_addr.clone(),
        install_date: ctx.days_ago(rng.int(365..=1095)),
        wire_mode_code: "1",
        operated_time: ctx.generated_at,
        data_plat_chg_time: ctx.generated_at,
        is_install_branch_equ: "1",
        factory_id: rng.id("FAC"),
        elec_cust_no: terminal.elec_cust_no.clone(),
        offline_flag: "0",
        box_cabinet_position_no: "1",
        lat: rng.uniform_rounded(22.0, 24.0, 6),
        term_useage: "1",
        lng: rng.uniform_rounded(113.0, 115.0, 6),
        total_factor: rng.uniform_rounded(1.0, 10.0, 3),
        market_prj_id: rng.id("PRJ"),
        market_prj_no: rng.tagged("PRJ", 100_000..=999_999),
        meter_box_cabinet_id: rng.id("BOX"),
        metering_point_number: terminal.metering_point_number.clone(),
        equ_id: terminal.equ_id.clone(),
        equ_model_code: rng.tagged("MODEL", 100..=999),
        equ_sort_code: "1",
        equ_type_code: "1",
        equ_main_person_id: rng.id("PER"),
        assets_no: terminal.assets_no.clone(),
        converter1: "RS485",
        converter2: "GPRS",
        rotate_cycle: "8",
        maintain_group: "运维班组A",
        run_up_comm_code: "GPRS",
        run_down_comm_code: "RS485",
        comm_addr: terminal.comm_addr.clone(),
        down_comm_channel: "RS485",
        metering_point_name,
        comm_type: "GPRS",
        protocol_type: "DL/T645-2007",
        term_type_code: "1",
        preset_amt: round_to(rng.uniform(100.0, 500.0), 2),
        remarks: "正常运行",
        manufacturer_name: terminal.manufacturer,
    }
}
